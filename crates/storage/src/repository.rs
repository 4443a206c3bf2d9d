//! Repository Implementation

use crate::models::{Location, TemperatureReading, Thermometer};
use crate::StorageError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Default page size for per-thermometer reading history
pub const DEFAULT_READING_LIMIT: u32 = 10;

/// Locations created by [`Repository::seed_demo_data`]
pub const DEMO_LOCATIONS: [&str; 3] = ["Living Room", "Kitchen", "Basement"];

/// Thermometers created per demo location
pub const DEMO_THERMOMETERS_PER_LOCATION: usize = 3;

/// Data access over the location, thermometer and reading tables.
///
/// Lookups return `Ok(None)` for missing rows; deciding whether that is an
/// error is left to the caller. Every write commits its own transaction
/// before returning.
#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, StorageError> {
        let rows = sqlx::query_as::<_, Location>("SELECT id, name FROM locations")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_location(&self, id: i64) -> Result<Option<Location>, StorageError> {
        let row = sqlx::query_as::<_, Location>("SELECT id, name FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fails with [`StorageError::ConstraintViolation`] if the name is taken
    pub async fn create_location(&self, name: &str) -> Result<Location, StorageError> {
        let mut tx = self.pool.begin().await?;
        let location = insert_location(&mut tx, name).await?;
        tx.commit().await?;

        info!(id = location.id, name, "Created location");
        Ok(location)
    }

    /// All thermometers, or only those at `location_id` when given
    pub async fn list_thermometers(
        &self,
        location_id: Option<i64>,
    ) -> Result<Vec<Thermometer>, StorageError> {
        let rows = match location_id {
            Some(location_id) => {
                sqlx::query_as::<_, Thermometer>(
                    "SELECT id, name, location_id FROM thermometers WHERE location_id = ?",
                )
                .bind(location_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Thermometer>("SELECT id, name, location_id FROM thermometers")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_thermometer(&self, id: i64) -> Result<Option<Thermometer>, StorageError> {
        let row = sqlx::query_as::<_, Thermometer>(
            "SELECT id, name, location_id FROM thermometers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fails with [`StorageError::ForeignKeyViolation`] if the location does not exist
    pub async fn create_thermometer(
        &self,
        name: &str,
        location_id: i64,
    ) -> Result<Thermometer, StorageError> {
        let mut tx = self.pool.begin().await?;
        let thermometer = insert_thermometer(&mut tx, name, location_id).await?;
        tx.commit().await?;

        info!(id = thermometer.id, name, location_id, "Created thermometer");
        Ok(thermometer)
    }

    /// Record a reading stamped with the current UTC time.
    ///
    /// Fails with [`StorageError::ForeignKeyViolation`] if the thermometer does not exist.
    pub async fn add_reading(
        &self,
        thermometer_id: i64,
        value: f64,
    ) -> Result<TemperatureReading, StorageError> {
        self.add_reading_at(thermometer_id, value, Utc::now()).await
    }

    pub(crate) async fn add_reading_at(
        &self,
        thermometer_id: i64,
        value: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<TemperatureReading, StorageError> {
        let mut tx = self.pool.begin().await?;
        let reading = sqlx::query_as::<_, TemperatureReading>(
            "INSERT INTO temperature_readings (thermometer_id, timestamp, value) VALUES (?, ?, ?) \
             RETURNING id, thermometer_id, timestamp, value",
        )
        .bind(thermometer_id)
        .bind(timestamp)
        .bind(value)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(id = reading.id, thermometer_id, value, "Inserted reading");
        Ok(reading)
    }

    /// The `limit` most recent readings for a thermometer, newest first.
    ///
    /// Readings sharing a timestamp are ordered by descending id.
    pub async fn list_readings(
        &self,
        thermometer_id: i64,
        limit: u32,
    ) -> Result<Vec<TemperatureReading>, StorageError> {
        let rows = sqlx::query_as::<_, TemperatureReading>(
            "SELECT id, thermometer_id, timestamp, value FROM temperature_readings \
             WHERE thermometer_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(thermometer_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create the fixed demo locations and their thermometers.
    ///
    /// Runs as one transaction: a second call hits the unique location
    /// names and leaves the store untouched.
    pub async fn seed_demo_data(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for name in DEMO_LOCATIONS {
            let location = insert_location(&mut tx, name).await?;
            for n in 1..=DEMO_THERMOMETERS_PER_LOCATION {
                insert_thermometer(&mut tx, &format!("{name} Thermometer {n}"), location.id)
                    .await?;
            }
        }
        tx.commit().await?;

        info!(
            locations = DEMO_LOCATIONS.len(),
            thermometers = DEMO_LOCATIONS.len() * DEMO_THERMOMETERS_PER_LOCATION,
            "Demo data created"
        );
        Ok(())
    }
}

async fn insert_location(conn: &mut SqliteConnection, name: &str) -> Result<Location, StorageError> {
    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (name) VALUES (?) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;
    Ok(location)
}

async fn insert_thermometer(
    conn: &mut SqliteConnection,
    name: &str,
    location_id: i64,
) -> Result<Thermometer, StorageError> {
    let thermometer = sqlx::query_as::<_, Thermometer>(
        "INSERT INTO thermometers (name, location_id) VALUES (?, ?) RETURNING id, name, location_id",
    )
    .bind(name)
    .bind(location_id)
    .fetch_one(conn)
    .await?;
    Ok(thermometer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_pool;
    use chrono::TimeZone;

    async fn repo() -> Repository {
        Repository::new(memory_pool().await.unwrap())
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_location_create_and_get() {
        let repo = repo().await;

        let lab = repo.create_location("Lab").await.unwrap();
        let office = repo.create_location("Office").await.unwrap();

        assert_eq!(repo.get_location(lab.id).await.unwrap().unwrap().name, "Lab");
        assert_eq!(repo.get_location(office.id).await.unwrap().unwrap().name, "Office");
        assert_eq!(repo.list_locations().await.unwrap().len(), 2);
        assert!(repo.get_location(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_location_name() {
        let repo = repo().await;
        repo.create_location("Lab").await.unwrap();

        let err = repo.create_location("Lab").await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert_eq!(repo.list_locations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_thermometer_requires_location() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        repo.create_thermometer("T1", lab.id).await.unwrap();

        let err = repo.create_thermometer("Ghost", 999).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation(_)));

        let all = repo.list_thermometers(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "T1");
    }

    #[tokio::test]
    async fn test_thermometer_location_filter() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        let office = repo.create_location("Office").await.unwrap();
        repo.create_thermometer("T1", lab.id).await.unwrap();
        repo.create_thermometer("T2", lab.id).await.unwrap();
        let t3 = repo.create_thermometer("T3", office.id).await.unwrap();

        assert_eq!(repo.list_thermometers(None).await.unwrap().len(), 3);
        assert_eq!(repo.list_thermometers(Some(lab.id)).await.unwrap().len(), 2);
        assert_eq!(repo.list_thermometers(Some(office.id)).await.unwrap(), vec![t3.clone()]);
        assert!(repo.list_thermometers(Some(999)).await.unwrap().is_empty());
        assert_eq!(repo.get_thermometer(t3.id).await.unwrap(), Some(t3));
    }

    #[tokio::test]
    async fn test_reading_requires_thermometer() {
        let repo = repo().await;
        let err = repo.add_reading(999, 21.5).await.unwrap_err();
        assert!(matches!(err, StorageError::ForeignKeyViolation(_)));
    }

    #[tokio::test]
    async fn test_add_reading_then_latest_page() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        let t1 = repo.create_thermometer("T1", lab.id).await.unwrap();

        repo.add_reading(t1.id, 19.0).await.unwrap();
        let reading = repo.add_reading(t1.id, 21.5).await.unwrap();

        let page = repo.list_readings(t1.id, 1).await.unwrap();
        assert_eq!(page, vec![reading]);
    }

    #[tokio::test]
    async fn test_list_readings_order_and_limit() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        let t1 = repo.create_thermometer("T1", lab.id).await.unwrap();

        for i in 0..15 {
            repo.add_reading_at(t1.id, i as f64, at(i)).await.unwrap();
        }

        let page = repo.list_readings(t1.id, DEFAULT_READING_LIMIT).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].value, 14.0);
        assert!(page.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        assert!(repo.list_readings(t1.id, 0).await.unwrap().is_empty());
        assert_eq!(repo.list_readings(t1.id, 100).await.unwrap().len(), 15);
    }

    #[tokio::test]
    async fn test_list_readings_tie_orders_by_id() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        let t1 = repo.create_thermometer("T1", lab.id).await.unwrap();

        let first = repo.add_reading_at(t1.id, 1.0, at(0)).await.unwrap();
        let second = repo.add_reading_at(t1.id, 2.0, at(0)).await.unwrap();

        let page = repo.list_readings(t1.id, 10).await.unwrap();
        assert_eq!(page, vec![second, first]);
    }

    #[tokio::test]
    async fn test_timestamp_round_trips() {
        let repo = repo().await;
        let lab = repo.create_location("Lab").await.unwrap();
        let t1 = repo.create_thermometer("T1", lab.id).await.unwrap();

        let ts = at(42);
        repo.add_reading_at(t1.id, 3.0, ts).await.unwrap();
        assert_eq!(repo.list_readings(t1.id, 1).await.unwrap()[0].timestamp, ts);
    }

    #[tokio::test]
    async fn test_seed_demo_data() {
        let repo = repo().await;
        repo.seed_demo_data().await.unwrap();

        let locations = repo.list_locations().await.unwrap();
        assert_eq!(locations.len(), 3);
        for location in &locations {
            let therms = repo.list_thermometers(Some(location.id)).await.unwrap();
            assert_eq!(therms.len(), DEMO_THERMOMETERS_PER_LOCATION);
            assert!(therms
                .iter()
                .all(|t| t.name.starts_with(&format!("{} Thermometer", location.name))));
        }

        let err = repo.seed_demo_data().await.unwrap_err();
        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert_eq!(repo.list_locations().await.unwrap().len(), 3);
        assert_eq!(repo.list_thermometers(None).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_ping() {
        repo().await.ping().await.unwrap();
    }
}
