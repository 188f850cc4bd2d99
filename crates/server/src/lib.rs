//! Pixelnet canvas server library.

pub mod config;
pub mod cooldown;
pub mod grid;
pub mod http;
pub mod identity;
pub mod locks;
pub mod placement;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use cooldown::{CooldownStore, CooldownTracker, MemoryCooldowns};
pub use grid::GridStore;
pub use http::{router, ApiState};
pub use identity::{ClientIdentity, Identity};
pub use placement::{Placement, PlacementError, PlacementService};
pub use store::{Collection, PixelCollection, StoreError};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State type used by the shipped binaries.
pub type DefaultState = ApiState<Collection, MemoryCooldowns>;

/// Open the configured store, build the placement service and start the
/// cooldown sweeper.
pub async fn bootstrap(config: &Config) -> anyhow::Result<Arc<DefaultState>> {
    let collection = Collection::open(&config.store).await?;
    let service = Arc::new(PlacementService::new(
        collection,
        MemoryCooldowns::new(),
        config.cooldown.window(),
        config.grid.size(),
    ));

    if config.cooldown.sweep_interval_secs > 0 {
        let sweeper = Arc::clone(&service);
        let every = Duration::from_secs(config.cooldown.sweep_interval_secs);
        tokio::spawn(async move {
            placement::run_cooldown_sweeper(sweeper, every).await;
        });
    }

    Ok(ApiState::new(service, config.server.name.clone()))
}

/// Run the API server (no frontend assets).
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = bootstrap(&config).await?;

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
