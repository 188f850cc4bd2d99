//! Document store abstraction behind the grid.
//!
//! The grid only needs three operations from its backing store, modelled on
//! a document collection: list everything, delete the document matching a
//! coordinate, insert a document. No cross-document transactions.

mod file;
mod memory;

pub use file::FileCollection;
pub use memory::MemoryCollection;

use crate::config::StoreConfig;
use protocol::Pixel;
use std::future::Future;
use thiserror::Error;
use tracing::info;

/// Errors raised by a pixel store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A collection of pixel documents.
pub trait PixelCollection: Send + Sync {
    /// Every stored document, in no particular order.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Pixel>, StoreError>> + Send;

    /// Remove the first document at `(x, y)`. Returns how many were removed.
    fn delete_one(&self, x: u32, y: u32) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn insert_one(&self, pixel: Pixel) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Short backend label reported by `GET /api`.
    fn backend_name(&self) -> &'static str {
        "custom"
    }
}

/// The store selected by configuration.
#[derive(Debug)]
pub enum Collection {
    Memory(MemoryCollection),
    File(FileCollection),
}

impl Collection {
    /// Open the configured store: a JSON snapshot file when `path` is set,
    /// otherwise an in-memory collection.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.path {
            Some(path) => {
                let collection = FileCollection::open(path).await?;
                info!("Pixel store: {} ({} pixels)", path.display(), collection.len().await);
                Ok(Self::File(collection))
            }
            None => {
                info!("Pixel store: in-memory (not persisted)");
                Ok(Self::Memory(MemoryCollection::new()))
            }
        }
    }
}

impl PixelCollection for Collection {
    async fn find_all(&self) -> Result<Vec<Pixel>, StoreError> {
        match self {
            Self::Memory(c) => c.find_all().await,
            Self::File(c) => c.find_all().await,
        }
    }

    async fn delete_one(&self, x: u32, y: u32) -> Result<u64, StoreError> {
        match self {
            Self::Memory(c) => c.delete_one(x, y).await,
            Self::File(c) => c.delete_one(x, y).await,
        }
    }

    async fn insert_one(&self, pixel: Pixel) -> Result<(), StoreError> {
        match self {
            Self::Memory(c) => c.insert_one(pixel).await,
            Self::File(c) => c.insert_one(pixel).await,
        }
    }

    fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(c) => c.backend_name(),
            Self::File(c) => c.backend_name(),
        }
    }
}
