//! Shared protocol crate for pixelnet.
//!
//! This crate contains:
//! - The `Pixel` record exchanged by every endpoint
//! - Request parsing/validation and response bodies
//! - Endpoint paths shared by the server router and the client

mod error;
pub mod packets;

pub use error::ProtocolError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One painted grid coordinate: the latest color placed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    /// Color as sent by the placer (usually `#rrggbb`).
    pub color: String,
    /// Anonymized label of the placer, never the raw rate-limit key.
    pub owner: String,
    pub timestamp: DateTime<Utc>,
}

/// Fixed grid dimensions, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `(x, y)` addresses a cell of this grid. Accepts signed input
    /// so screen-derived coordinates can be checked before conversion.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}
