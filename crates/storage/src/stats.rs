//! Aggregate Queries
//!
//! Latest reading per thermometer and min/max/avg/count summaries, computed
//! in SQL over the readings table.

use crate::models::{LocationStats, TemperatureReading, ThermometerStats};
use crate::repository::Repository;
use crate::StorageError;

/// One row of MIN/MAX/AVG/COUNT; the first three are NULL over an empty set
#[derive(Debug, sqlx::FromRow)]
struct Aggregate {
    min: Option<f64>,
    max: Option<f64>,
    avg: Option<f64>,
    count: i64,
}

impl Repository {
    /// Exactly one reading per thermometer that has any: the newest one.
    ///
    /// On equal timestamps the reading with the highest id wins.
    pub async fn latest_readings(&self) -> Result<Vec<TemperatureReading>, StorageError> {
        let rows = sqlx::query_as::<_, TemperatureReading>(
            "SELECT id, thermometer_id, timestamp, value FROM (
                 SELECT id, thermometer_id, timestamp, value,
                        ROW_NUMBER() OVER (
                            PARTITION BY thermometer_id
                            ORDER BY timestamp DESC, id DESC
                        ) AS rn
                 FROM temperature_readings
             )
             WHERE rn = 1
             ORDER BY thermometer_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Summary over one thermometer's readings; count is 0 when there are none
    pub async fn thermometer_stats(
        &self,
        thermometer_id: i64,
    ) -> Result<ThermometerStats, StorageError> {
        let agg = sqlx::query_as::<_, Aggregate>(
            "SELECT MIN(value) AS min, MAX(value) AS max, AVG(value) AS avg, COUNT(id) AS count
             FROM temperature_readings
             WHERE thermometer_id = ?",
        )
        .bind(thermometer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ThermometerStats {
            thermometer_id,
            min: agg.min,
            max: agg.max,
            avg: agg.avg,
            count: agg.count,
        })
    }

    /// Summary over every reading from every thermometer at the location.
    ///
    /// Thermometers without readings contribute nothing.
    pub async fn location_stats(&self, location_id: i64) -> Result<LocationStats, StorageError> {
        let agg = sqlx::query_as::<_, Aggregate>(
            "SELECT MIN(r.value) AS min, MAX(r.value) AS max, AVG(r.value) AS avg, COUNT(r.id) AS count
             FROM temperature_readings r
             JOIN thermometers t ON t.id = r.thermometer_id
             WHERE t.location_id = ?",
        )
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(LocationStats {
            location_id,
            min: agg.min,
            max: agg.max,
            avg: agg.avg,
            count: agg.count,
        })
    }
}
