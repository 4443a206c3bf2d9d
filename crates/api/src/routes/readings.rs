//! Reading Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use storage::{TemperatureReading, DEFAULT_READING_LIMIT};
use tracing::info;

use super::require_thermometer;
use crate::{ApiError, AppState};

/// Body for submitting a reading
#[derive(Debug, Deserialize)]
pub struct CreateReading {
    pub thermometer_id: i64,
    pub value: f64,
}

/// Query parameters for reading history
#[derive(Debug, Deserialize)]
pub struct ReadingQuery {
    /// Maximum number of readings, newest first
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_READING_LIMIT
}

/// Record a reading stamped with the current time
pub async fn add_reading(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateReading>,
) -> Result<Json<TemperatureReading>, ApiError> {
    info!(thermometer_id = body.thermometer_id, "Adding temperature reading");
    require_thermometer(&state.repository, body.thermometer_id).await?;

    let reading = state
        .repository
        .add_reading(body.thermometer_id, body.value)
        .await?;
    metrics::counter!("temp_monitor_readings_recorded_total").increment(1);

    Ok(Json(reading))
}

/// Newest reading of every thermometer that has one
pub async fn latest_readings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureReading>>, ApiError> {
    info!("Fetching latest readings for all thermometers");
    Ok(Json(state.repository.latest_readings().await?))
}

pub async fn list_readings(
    State(state): State<Arc<AppState>>,
    Path(thermometer_id): Path<i64>,
    Query(params): Query<ReadingQuery>,
) -> Result<Json<Vec<TemperatureReading>>, ApiError> {
    info!(thermometer_id, limit = params.limit, "Fetching readings");
    require_thermometer(&state.repository, thermometer_id).await?;

    let readings = state
        .repository
        .list_readings(thermometer_id, params.limit)
        .await?;
    Ok(Json(readings))
}
