//! REST API: routes, handlers and error responses.

use crate::cooldown::CooldownStore;
use crate::identity::ClientIdentity;
use crate::placement::{PlacementError, PlacementService};
use crate::store::PixelCollection;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use protocol::packets::{
    messages, CooldownStatus, ErrorBody, PlaceResponse, ServerInfo, API_PREFIX, COOLDOWN_PATH,
    PIXELS_PATH,
};
use protocol::Pixel;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

/// Shared state handed to every handler.
pub struct ApiState<C, T> {
    pub service: Arc<PlacementService<C, T>>,
    /// Name reported by `GET /api`.
    pub name: String,
}

impl<C, T> ApiState<C, T> {
    pub fn new(service: Arc<PlacementService<C, T>>, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            service,
            name: name.into(),
        })
    }
}

/// Build the API router. Layers (CORS, tracing) are left to the caller.
pub fn router<C, T>(state: Arc<ApiState<C, T>>) -> Router
where
    C: PixelCollection + 'static,
    T: CooldownStore + 'static,
{
    Router::new()
        .route(API_PREFIX, get(server_info::<C, T>))
        .route(PIXELS_PATH, get(list_pixels::<C, T>).post(place_pixel::<C, T>))
        .route(COOLDOWN_PATH, get(cooldown_status::<C, T>))
        .with_state(state)
}

async fn server_info<C, T>(State(state): State<Arc<ApiState<C, T>>>) -> Json<ServerInfo>
where
    C: PixelCollection,
    T: CooldownStore,
{
    let endpoints = BTreeMap::from([
        (format!("GET {}", PIXELS_PATH), "Fetch every pixel".to_string()),
        (format!("POST {}", PIXELS_PATH), "Place a new pixel".to_string()),
        (format!("GET {}", COOLDOWN_PATH), "Check the cooldown status".to_string()),
    ]);

    Json(ServerInfo {
        name: state.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        endpoints,
        grid: state.service.grid_size(),
        storage: state.service.storage_name().to_string(),
    })
}

async fn list_pixels<C, T>(
    State(state): State<Arc<ApiState<C, T>>>,
) -> Result<Json<Vec<Pixel>>, PlacementError>
where
    C: PixelCollection,
    T: CooldownStore,
{
    Ok(Json(state.service.pixels().await?))
}

async fn cooldown_status<C, T>(
    State(state): State<Arc<ApiState<C, T>>>,
    ClientIdentity(identity): ClientIdentity,
) -> Json<CooldownStatus>
where
    C: PixelCollection,
    T: CooldownStore,
{
    Json(state.service.cooldown_status(&identity).await)
}

async fn place_pixel<C, T>(
    State(state): State<Arc<ApiState<C, T>>>,
    ClientIdentity(identity): ClientIdentity,
    body: Bytes,
) -> Result<Json<PlaceResponse>, PlacementError>
where
    C: PixelCollection,
    T: CooldownStore,
{
    let placement = state.service.place_json(&identity, &body).await?;
    Ok(Json(PlaceResponse::placed(placement.pixel, placement.cooldown_secs)))
}

impl IntoResponse for PlacementError {
    fn into_response(self) -> Response {
        match self {
            PlacementError::InvalidInput(_) | PlacementError::OutOfBounds { .. } => {
                warn!("Rejected placement: {}", self);
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(messages::INVALID_DATA))).into_response()
            }
            PlacementError::RateLimited {
                remaining_secs,
                window_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorBody::cooldown(remaining_secs, window_secs)),
            )
                .into_response(),
            PlacementError::Store(e) => {
                error!("Pixel store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(messages::SERVER_ERROR)),
                )
                    .into_response()
            }
        }
    }
}
