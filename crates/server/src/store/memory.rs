//! In-memory pixel collection.

use super::{PixelCollection, StoreError};
use protocol::Pixel;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryCollection {
    docs: RwLock<Vec<Pixel>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pixels(pixels: Vec<Pixel>) -> Self {
        Self {
            docs: RwLock::new(pixels),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }
}

impl PixelCollection for MemoryCollection {
    async fn find_all(&self) -> Result<Vec<Pixel>, StoreError> {
        Ok(self.docs.read().await.clone())
    }

    async fn delete_one(&self, x: u32, y: u32) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|p| p.x == x && p.y == y) {
            Some(idx) => {
                docs.swap_remove(idx);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn insert_one(&self, pixel: Pixel) -> Result<(), StoreError> {
        self.docs.write().await.push(pixel);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
