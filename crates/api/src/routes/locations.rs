//! Location Routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use storage::Location;
use tracing::info;

use super::require_location;
use crate::{ApiError, AppState};

/// Body for creating a location
#[derive(Debug, Deserialize)]
pub struct CreateLocation {
    pub name: String,
}

/// List all locations
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Location>>, ApiError> {
    info!("Fetching all locations");
    Ok(Json(state.repository.list_locations().await?))
}

pub async fn get_location(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> Result<Json<Location>, ApiError> {
    info!(location_id, "Fetching location");
    Ok(Json(require_location(&state.repository, location_id).await?))
}

/// Create a location; duplicate names are rejected with 409
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateLocation>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.repository.create_location(&body.name).await?))
}
