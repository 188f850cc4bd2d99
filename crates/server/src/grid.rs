//! Authoritative canvas state: one pixel per coordinate, last write wins.

use crate::locks::KeyedLocks;
use crate::store::{PixelCollection, StoreError};
use chrono::Utc;
use protocol::Pixel;
use tracing::debug;

pub struct GridStore<C> {
    collection: C,
    cell_locks: KeyedLocks<(u32, u32)>,
}

impl<C: PixelCollection> GridStore<C> {
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            cell_locks: KeyedLocks::new(),
        }
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Every painted pixel, in no meaningful order.
    pub async fn get_all(&self) -> Result<Vec<Pixel>, StoreError> {
        self.collection.find_all().await
    }

    /// Replace whatever is at `(x, y)` with a fresh pixel stamped now.
    ///
    /// Writers to the same coordinate are serialized. The insert is only
    /// issued once the delete has succeeded, so a failing store can lose
    /// the previous pixel but never leaves two at one coordinate.
    pub async fn put(&self, x: u32, y: u32, color: &str, owner: &str) -> Result<Pixel, StoreError> {
        let _cell = self.cell_locks.lock(&(x, y)).await;

        let replaced = self.collection.delete_one(x, y).await?;

        let pixel = Pixel {
            x,
            y,
            color: color.to_string(),
            owner: owner.to_string(),
            timestamp: Utc::now(),
        };
        self.collection.insert_one(pixel.clone()).await?;

        debug!("Pixel ({}, {}) = {} by {} (replaced {})", x, y, color, owner, replaced);
        Ok(pixel)
    }
}
