//! Row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical site holding thermometers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
}

/// A sensor belonging to exactly one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thermometer {
    pub id: i64,
    pub name: String,
    pub location_id: i64,
}

/// Immutable timestamped sample from one thermometer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TemperatureReading {
    pub id: i64,
    pub thermometer_id: i64,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Aggregates over one thermometer's readings.
///
/// `min`, `max` and `avg` are `None` when `count` is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermometerStats {
    pub thermometer_id: i64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: i64,
}

/// Aggregates over the readings of every thermometer at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationStats {
    pub location_id: i64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: i64,
}
