//! Statistics Routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use storage::{LocationStats, ThermometerStats};
use tracing::info;

use super::{require_location, require_thermometer};
use crate::{ApiError, AppState};

pub async fn thermometer_stats(
    State(state): State<Arc<AppState>>,
    Path(thermometer_id): Path<i64>,
) -> Result<Json<ThermometerStats>, ApiError> {
    info!(thermometer_id, "Fetching thermometer stats");
    require_thermometer(&state.repository, thermometer_id).await?;
    Ok(Json(state.repository.thermometer_stats(thermometer_id).await?))
}

/// Stats across every thermometer at the location
pub async fn location_stats(
    State(state): State<Arc<AppState>>,
    Path(location_id): Path<i64>,
) -> Result<Json<LocationStats>, ApiError> {
    info!(location_id, "Fetching location stats");
    require_location(&state.repository, location_id).await?;
    Ok(Json(state.repository.location_stats(location_id).await?))
}
