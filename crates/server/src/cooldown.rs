//! Per-identity placement cooldowns.
//!
//! Entries are never deleted on expiry: an entry older than the window is
//! treated exactly like a missing one. Checks are evaluated lazily against
//! the `now` supplied by the caller.

use crate::identity::Identity;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Keyed store of last successful placement times.
///
/// Shaped like a TTL cache so a shared cache can replace the process-local
/// table without touching the placement logic.
pub trait CooldownStore: Send + Sync {
    fn last_placement(&self, identity: &Identity) -> impl Future<Output = Option<Instant>> + Send;

    fn set_last_placement(&self, identity: &Identity, at: Instant) -> impl Future<Output = ()> + Send;

    /// Drop entries recorded at or before `cutoff`. Returns how many were dropped.
    fn prune_before(&self, cutoff: Instant) -> impl Future<Output = usize> + Send;
}

/// Process-local cooldown table. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCooldowns {
    entries: RwLock<HashMap<Identity, Instant>>,
}

impl MemoryCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl CooldownStore for MemoryCooldowns {
    async fn last_placement(&self, identity: &Identity) -> Option<Instant> {
        self.entries.read().await.get(identity).copied()
    }

    async fn set_last_placement(&self, identity: &Identity, at: Instant) {
        self.entries.write().await.insert(identity.clone(), at);
    }

    async fn prune_before(&self, cutoff: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, last| *last > cutoff);
        before - entries.len()
    }
}

/// Result of a cooldown lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownCheck {
    pub blocked: bool,
    /// Zero unless `blocked`.
    pub remaining: Duration,
}

impl CooldownCheck {
    const CLEAR: Self = Self {
        blocked: false,
        remaining: Duration::ZERO,
    };

    /// Remaining time in whole seconds, rounded up.
    pub fn remaining_secs(&self) -> u64 {
        ceil_secs(self.remaining)
    }
}

/// Whole seconds rounded up: 1ms left reports as 1, never 0.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Enforces a fixed quiescent window between placements of one identity.
#[derive(Debug)]
pub struct CooldownTracker<T> {
    store: T,
    window: Duration,
}

impl<T: CooldownStore> CooldownTracker<T> {
    pub fn new(store: T, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn window_secs(&self) -> u64 {
        ceil_secs(self.window)
    }

    /// Blocked iff an entry exists and less than the window has elapsed.
    pub async fn is_blocked(&self, identity: &Identity, now: Instant) -> CooldownCheck {
        let Some(last) = self.store.last_placement(identity).await else {
            return CooldownCheck::CLEAR;
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.window {
            CooldownCheck {
                blocked: true,
                remaining: self.window - elapsed,
            }
        } else {
            CooldownCheck::CLEAR
        }
    }

    /// Unconditionally overwrite the identity's last placement time.
    pub async fn record(&self, identity: &Identity, now: Instant) {
        self.store.set_last_placement(identity, now).await;
    }

    /// Drop entries that have already expired relative to `now`.
    pub async fn prune(&self, now: Instant) -> usize {
        match now.checked_sub(self.window) {
            Some(cutoff) => self.store.prune_before(cutoff).await,
            None => 0,
        }
    }
}
