//! Placement request handling.
//!
//! A request moves through `validated -> cooldown checked -> committed`, or
//! stops early with a [`PlacementError`]. The cooldown check runs before any
//! grid mutation and the cooldown is recorded only after the commit, all
//! inside a per-identity critical section so concurrent requests of one
//! identity cannot both pass the check.

use crate::cooldown::{CooldownStore, CooldownTracker};
use crate::grid::GridStore;
use crate::identity::Identity;
use crate::locks::KeyedLocks;
use crate::store::{PixelCollection, StoreError};
use protocol::packets::{CooldownStatus, PlaceRequest};
use protocol::{GridSize, Pixel, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, Instant};
use tracing::{debug, info};

/// Why a placement was refused.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("Invalid placement request: {0}")]
    InvalidInput(#[from] ProtocolError),

    #[error("Coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("Cooldown active: {remaining_secs}s of {window_secs}s remaining")]
    RateLimited { remaining_secs: u64, window_secs: u64 },

    #[error("Pixel store failure: {0}")]
    Store(#[from] StoreError),
}

/// A committed placement.
#[derive(Debug, Clone)]
pub struct Placement {
    pub pixel: Pixel,
    /// Full cooldown window now applying to the placer, in seconds.
    pub cooldown_secs: u64,
}

pub struct PlacementService<C, T> {
    grid: GridStore<C>,
    cooldowns: CooldownTracker<T>,
    identity_locks: KeyedLocks<Identity>,
    grid_size: GridSize,
}

impl<C: PixelCollection, T: CooldownStore> PlacementService<C, T> {
    pub fn new(collection: C, cooldown_store: T, window: Duration, grid_size: GridSize) -> Self {
        Self {
            grid: GridStore::new(collection),
            cooldowns: CooldownTracker::new(cooldown_store, window),
            identity_locks: KeyedLocks::new(),
            grid_size,
        }
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    pub fn cooldown_secs(&self) -> u64 {
        self.cooldowns.window_secs()
    }

    pub fn storage_name(&self) -> &'static str {
        self.grid.collection().backend_name()
    }

    pub async fn pixels(&self) -> Result<Vec<Pixel>, PlacementError> {
        Ok(self.grid.get_all().await?)
    }

    /// Cooldown state of `identity` as reported to clients.
    pub async fn cooldown_status(&self, identity: &Identity) -> CooldownStatus {
        let check = self.cooldowns.is_blocked(identity, Instant::now()).await;
        CooldownStatus {
            in_cooldown: check.blocked,
            remaining_time: check.remaining_secs(),
            cooldown_time: self.cooldown_secs(),
        }
    }

    /// Parse a raw request body and place it.
    pub async fn place_json(&self, identity: &Identity, body: &[u8]) -> Result<Placement, PlacementError> {
        let request = PlaceRequest::from_slice(body)?;
        self.place(identity, request).await
    }

    pub async fn place(&self, identity: &Identity, request: PlaceRequest) -> Result<Placement, PlacementError> {
        if !self.grid_size.contains(request.x, request.y) {
            return Err(PlacementError::OutOfBounds {
                x: request.x,
                y: request.y,
            });
        }
        let (x, y) = (request.x as u32, request.y as u32);

        let _turn = self.identity_locks.lock(identity).await;

        let check = self.cooldowns.is_blocked(identity, Instant::now()).await;
        if check.blocked {
            debug!("{} still cooling down ({}s)", identity, check.remaining_secs());
            return Err(PlacementError::RateLimited {
                remaining_secs: check.remaining_secs(),
                window_secs: self.cooldown_secs(),
            });
        }

        let owner = identity.anonymize();
        let pixel = self.grid.put(x, y, &request.color, &owner).await?;

        self.cooldowns.record(identity, Instant::now()).await;
        info!("{} placed {} at ({}, {})", owner, pixel.color, x, y);

        Ok(Placement {
            pixel,
            cooldown_secs: self.cooldown_secs(),
        })
    }

    /// Forget cooldown entries that have already expired.
    pub async fn sweep_expired(&self) -> usize {
        self.cooldowns.prune(Instant::now()).await
    }
}

/// Periodically prune expired cooldown entries.
pub async fn run_cooldown_sweeper<C, T>(service: Arc<PlacementService<C, T>>, every: Duration)
where
    C: PixelCollection,
    T: CooldownStore,
{
    let mut ticker = interval(every);
    info!("Cooldown sweeper started (interval: {:?})", every);

    loop {
        ticker.tick().await;
        let pruned = service.sweep_expired().await;
        if pruned > 0 {
            debug!("Pruned {} expired cooldown entries", pruned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::MemoryCooldowns;
    use crate::store::{FileCollection, MemoryCollection};

    type Service = PlacementService<MemoryCollection, MemoryCooldowns>;

    fn service() -> Service {
        PlacementService::new(
            MemoryCollection::new(),
            MemoryCooldowns::new(),
            Duration::from_secs(300),
            GridSize::new(100, 100),
        )
    }

    fn alice() -> Identity {
        Identity::Addr("198.51.100.4".to_string())
    }

    /// Failing store: every operation errors, or only inserts do.
    struct BrokenStore {
        fail_delete: bool,
    }

    impl PixelCollection for BrokenStore {
        async fn find_all(&self) -> Result<Vec<Pixel>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }

        async fn delete_one(&self, _x: u32, _y: u32) -> Result<u64, StoreError> {
            if self.fail_delete {
                Err(StoreError::Unavailable("down".into()))
            } else {
                Ok(0)
            }
        }

        async fn insert_one(&self, _pixel: Pixel) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write refused".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reference_scenario() {
        let service = service();

        let placed = service
            .place(&alice(), PlaceRequest::new(5, 5, "#ff0000"))
            .await
            .unwrap();
        assert_eq!(placed.cooldown_secs, 300);
        assert_eq!(placed.pixel.owner, "IP_198_51_100_4");

        tokio::time::advance(Duration::from_secs(10)).await;
        let err = service
            .place(&alice(), PlaceRequest::new(6, 6, "#00ff00"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlacementError::RateLimited {
                remaining_secs: 290,
                window_secs: 300
            }
        ));

        tokio::time::advance(Duration::from_secs(291)).await;
        service
            .place(&alice(), PlaceRequest::new(6, 6, "#0000ff"))
            .await
            .unwrap();

        let mut pixels = service.pixels().await.unwrap();
        pixels.sort_by_key(|p| (p.x, p.y));
        let cells: Vec<_> = pixels.iter().map(|p| (p.x, p.y, p.color.as_str())).collect();
        assert_eq!(cells, vec![(5, 5, "#ff0000"), (6, 6, "#0000ff")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_has_no_cooldown_effect() {
        let service = service();

        let err = service.place_json(&alice(), br##"{"x": 1.5, "y": 2, "color": "#fff"}"##).await;
        assert!(matches!(err, Err(PlacementError::InvalidInput(_))));

        let err = service.place(&alice(), PlaceRequest::new(100, 0, "#fff")).await;
        assert!(matches!(err, Err(PlacementError::OutOfBounds { x: 100, y: 0 })));

        let err = service.place(&alice(), PlaceRequest::new(-1, 0, "#fff")).await;
        assert!(matches!(err, Err(PlacementError::OutOfBounds { .. })));

        assert!(!service.cooldown_status(&alice()).await.in_cooldown);
        assert!(service.pixels().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_status_reports_ceiling() {
        let service = service();
        service
            .place(&alice(), PlaceRequest::new(0, 0, "#123456"))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(800)).await;
        let status = service.cooldown_status(&alice()).await;
        assert!(status.in_cooldown);
        assert_eq!(status.remaining_time, 300);
        assert_eq!(status.cooldown_time, 300);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_records_no_cooldown() {
        for fail_delete in [true, false] {
            let service = PlacementService::new(
                BrokenStore { fail_delete },
                MemoryCooldowns::new(),
                Duration::from_secs(300),
                GridSize::new(10, 10),
            );

            let err = service.place(&alice(), PlaceRequest::new(1, 1, "#fff")).await;
            assert!(matches!(err, Err(PlacementError::Store(_))));
            assert!(!service.cooldown_status(&alice()).await.in_cooldown);
        }
    }

    #[tokio::test]
    async fn test_unwritable_snapshot_places_nothing() {
        let path = std::env::temp_dir()
            .join(format!("pixelnet-unwritable-{}", std::process::id()))
            .join("sub")
            .join("pixels.json");
        let service = PlacementService::new(
            FileCollection::open(&path).await.unwrap(),
            MemoryCooldowns::new(),
            Duration::from_secs(300),
            GridSize::new(10, 10),
        );

        for x in 0..3 {
            let err = service.place(&alice(), PlaceRequest::new(x, 1, "#fff")).await;
            assert!(matches!(err, Err(PlacementError::Store(_))));
        }

        assert!(service.pixels().await.unwrap().is_empty());
        assert!(!service.cooldown_status(&alice()).await.in_cooldown);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_of_one_identity() {
        let service = Arc::new(service());

        let attempts: Vec<_> = (0..16)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .place(&alice(), PlaceRequest::new(i, i, "#abcdef"))
                        .await
                })
            })
            .collect();

        let mut placed = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => placed += 1,
                Err(PlacementError::RateLimited { .. }) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(placed, 1);
        assert_eq!(service.pixels().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_expired() {
        let service = service();
        service
            .place(&alice(), PlaceRequest::new(0, 0, "#000"))
            .await
            .unwrap();

        assert_eq!(service.sweep_expired().await, 0);
        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(service.sweep_expired().await, 1);
    }
}
