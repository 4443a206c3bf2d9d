//! Thermometer Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use storage::Thermometer;
use tracing::info;

use super::{require_location, require_thermometer};
use crate::{ApiError, AppState};

/// Query parameters for the thermometer listing
#[derive(Debug, Deserialize)]
pub struct ThermometerQuery {
    /// Only thermometers at this location
    pub location_id: Option<i64>,
}

/// Body for creating a thermometer
#[derive(Debug, Deserialize)]
pub struct CreateThermometer {
    pub name: String,
    pub location_id: i64,
}

/// List thermometers, optionally filtered by location.
///
/// An unknown `location_id` yields an empty list.
pub async fn list_thermometers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ThermometerQuery>,
) -> Result<Json<Vec<Thermometer>>, ApiError> {
    info!(location_id = ?params.location_id, "Fetching thermometers");
    Ok(Json(
        state.repository.list_thermometers(params.location_id).await?,
    ))
}

pub async fn get_thermometer(
    State(state): State<Arc<AppState>>,
    Path(thermometer_id): Path<i64>,
) -> Result<Json<Thermometer>, ApiError> {
    info!(thermometer_id, "Fetching thermometer");
    Ok(Json(
        require_thermometer(&state.repository, thermometer_id).await?,
    ))
}

/// Register a thermometer under an existing location
pub async fn create_thermometer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateThermometer>,
) -> Result<Json<Thermometer>, ApiError> {
    require_location(&state.repository, body.location_id).await?;
    let thermometer = state
        .repository
        .create_thermometer(&body.name, body.location_id)
        .await?;
    Ok(Json(thermometer))
}
