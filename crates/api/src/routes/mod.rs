//! Route Handlers

pub mod demo;
pub mod locations;
pub mod readings;
pub mod stats;
pub mod thermometers;

use storage::{Location, Repository, Thermometer};
use tracing::warn;

use crate::ApiError;

const LOCATION_NOT_FOUND: &str = "Location not found";
const THERMOMETER_NOT_FOUND: &str = "Thermometer not found";

/// Resolve a location id or fail with 404
pub(crate) async fn require_location(repo: &Repository, id: i64) -> Result<Location, ApiError> {
    repo.get_location(id).await?.ok_or_else(|| {
        warn!(location_id = id, "Location not found");
        metrics::counter!("temp_monitor_not_found_total", "entity" => "location").increment(1);
        ApiError::NotFound(LOCATION_NOT_FOUND)
    })
}

/// Resolve a thermometer id or fail with 404
pub(crate) async fn require_thermometer(
    repo: &Repository,
    id: i64,
) -> Result<Thermometer, ApiError> {
    repo.get_thermometer(id).await?.ok_or_else(|| {
        warn!(thermometer_id = id, "Thermometer not found");
        metrics::counter!("temp_monitor_not_found_total", "entity" => "thermometer").increment(1);
        ApiError::NotFound(THERMOMETER_NOT_FOUND)
    })
}
