//! Server configuration.

use protocol::GridSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    ///
    /// A `PORT` environment variable overrides `server.port`.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(Path::new("config.toml"))?;
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.server.port = port;
        }
        Ok(config)
    }

    /// Load configuration from `path`, writing a default file if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Server networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Name reported by `GET /api`.
    #[serde(default = "default_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            name: default_name(),
        }
    }
}

fn default_port() -> u16 {
    3001
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_name() -> String {
    "Pixelnet API".to_string()
}

/// Canvas dimensions in cells. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    pub width: u32,
    #[serde(default = "default_grid_size")]
    pub height: u32,
}

impl GridConfig {
    pub fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_grid_size(),
            height: default_grid_size(),
        }
    }
}

fn default_grid_size() -> u32 {
    1000
}

/// Placement rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CooldownConfig {
    /// Minimum seconds between two successful placements of one identity.
    #[serde(default = "default_cooldown_seconds")]
    pub seconds: u64,
    /// How often expired entries are pruned from the in-memory table.
    /// Zero disables the sweeper.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl CooldownConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            seconds: default_cooldown_seconds(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_cooldown_seconds() -> u64 {
    300
}
fn default_sweep_interval() -> u64 {
    600
}

/// Pixel storage. Without a `path` the canvas lives in memory only.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON snapshot file backing the canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}
