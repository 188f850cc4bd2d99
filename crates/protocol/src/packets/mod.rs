//! Message definitions for the pixelnet REST protocol.
//!
//! This module contains both client->server and server->client bodies.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api";
/// `GET` lists all pixels, `POST` places one.
pub const PIXELS_PATH: &str = "/api/pixels";
/// `GET` reports the caller's cooldown.
pub const COOLDOWN_PATH: &str = "/api/cooldown";

/// Human-readable texts shared by server responses and client banners.
pub mod messages {
    pub const INVALID_DATA: &str = "Invalid data";
    pub const COOLDOWN_ACTIVE: &str = "Cooldown active";
    pub const COOLDOWN_WAIT: &str = "You must wait before placing another pixel";
    pub const PIXEL_PLACED: &str = "Pixel placed successfully!";
    pub const SERVER_ERROR: &str = "Server error";
}
