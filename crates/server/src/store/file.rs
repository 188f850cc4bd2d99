//! Pixel collection persisted as a JSON snapshot file.
//!
//! Reads are served from memory. Every mutation first rewrites the snapshot
//! through a temporary file followed by a rename, and only touches memory
//! once that succeeded. A failed write leaves both the file and the served
//! pixels as they were.

use super::{MemoryCollection, PixelCollection, StoreError};
use protocol::Pixel;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
pub struct FileCollection {
    path: PathBuf,
    docs: MemoryCollection,
    write_lock: Mutex<()>,
}

impl FileCollection {
    /// Load the snapshot at `path`. A missing or empty file is an empty canvas.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let pixels = match tokio::fs::read(path).await {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(data) => serde_json::from_slice::<Vec<Pixel>>(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            docs: MemoryCollection::with_pixels(pixels),
            write_lock: Mutex::new(()),
        })
    }

    pub async fn len(&self) -> usize {
        self.docs.len().await
    }

    /// Write `snapshot` to disk. Callers hold `write_lock`.
    async fn persist(&self, snapshot: &[Pixel]) -> Result<(), StoreError> {
        let data = serde_json::to_vec(snapshot)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Persisted {} pixels to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}

impl PixelCollection for FileCollection {
    async fn find_all(&self) -> Result<Vec<Pixel>, StoreError> {
        self.docs.find_all().await
    }

    async fn delete_one(&self, x: u32, y: u32) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.docs.find_all().await?;
        let Some(idx) = snapshot.iter().position(|p| p.x == x && p.y == y) else {
            return Ok(0);
        };
        snapshot.swap_remove(idx);

        self.persist(&snapshot).await?;
        self.docs.delete_one(x, y).await
    }

    async fn insert_one(&self, pixel: Pixel) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.docs.find_all().await?;
        snapshot.push(pixel.clone());

        self.persist(&snapshot).await?;
        self.docs.insert_one(pixel).await
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
