// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! SQLite activity store with typed operations.
//!
//! Owns two tables:
//! - `activities`, keyed by the Garmin activity ID, holding the pass-through
//!   attribute payload as JSON text
//! - `sensor_records`, keyed by `(activity_external_id, timestamp)`
//!
//! `start_time` and sample timestamps are stored in Garmin's local-time
//! format, which sorts lexicographically in chronological order.

use crate::error::AppError;
use crate::models::{Activity, SensorSample};
use crate::time_utils::{format_garmin, parse_garmin};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

/// SQLite-backed activity store.
#[derive(Clone)]
pub struct ActivityStore {
    pool: Pool<Sqlite>,
}

impl ActivityStore {
    /// Open (creating if missing) the store at `database_url` and run
    /// migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        // SQLite creates the file, but not its parent directory.
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!(
                            "Failed to create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open activity store: {e}")))?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(url = database_url, "Activity store ready");
        Ok(store)
    }

    /// In-memory store for tests. A single pooled connection keeps the
    /// database alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS activities (
                external_id TEXT PRIMARY KEY,
                start_time TEXT NOT NULL,
                attributes TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_activities_start_time
             ON activities (start_time DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sensor_records (
                activity_external_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                value INTEGER,
                PRIMARY KEY (activity_external_id, timestamp)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Insert or replace an activity keyed by its external ID.
    ///
    /// A re-observed activity overwrites `start_time` and `attributes`
    /// wholesale; it never creates a second row.
    pub async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        let attributes = serde_json::to_string(&activity.attributes)
            .map_err(|e| AppError::Database(format!("Failed to serialize attributes: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO activities (external_id, start_time, attributes)
            VALUES ($1, $2, $3)
            ON CONFLICT(external_id) DO UPDATE SET
                start_time = $2,
                attributes = $3
            ",
        )
        .bind(&activity.external_id)
        .bind(format_garmin(activity.start_time))
        .bind(attributes)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Total number of stored activities.
    pub async fn count_activities(&self) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) FROM activities")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count: i64 = row
            .try_get(0)
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count.unsigned_abs())
    }

    /// List stored activities, most recent first.
    pub async fn list_activities(&self, limit: u32) -> Result<Vec<Activity>, AppError> {
        let rows = sqlx::query(
            r"
            SELECT external_id, start_time, attributes
            FROM activities
            ORDER BY start_time DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(|row| activity_from_row(&row)).collect()
    }

    /// Fetch one stored activity by external ID.
    pub async fn get_activity(&self, external_id: &str) -> Result<Option<Activity>, AppError> {
        let row = sqlx::query(
            "SELECT external_id, start_time, attributes FROM activities WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(|r| activity_from_row(&r)).transpose()
    }

    // ─── Sensor Record Operations ────────────────────────────────

    /// Write the sensor samples for an activity, replacing any existing
    /// sample at the same timestamp.
    pub async fn upsert_samples(
        &self,
        external_id: &str,
        samples: &[SensorSample],
    ) -> Result<(), AppError> {
        for sample in samples {
            sqlx::query(
                r"
                INSERT INTO sensor_records (activity_external_id, timestamp, value)
                VALUES ($1, $2, $3)
                ON CONFLICT(activity_external_id, timestamp) DO UPDATE SET
                    value = $3
                ",
            )
            .bind(external_id)
            .bind(format_garmin(sample.timestamp))
            .bind(sample.value)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// All sensor samples for one activity, timestamp ascending. Unknown
    /// activities simply yield an empty list.
    pub async fn get_samples(&self, external_id: &str) -> Result<Vec<SensorSample>, AppError> {
        let rows = sqlx::query(
            r"
            SELECT timestamp, value
            FROM sensor_records
            WHERE activity_external_id = $1
            ORDER BY timestamp ASC
            ",
        )
        .bind(external_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let raw: String = row
                    .try_get("timestamp")
                    .map_err(|e| AppError::Database(e.to_string()))?;
                let value: Option<i64> = row
                    .try_get("value")
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(SensorSample {
                    timestamp: parse_garmin(&raw)
                        .map_err(|e| AppError::Database(format!("Bad timestamp {raw:?}: {e}")))?,
                    value,
                })
            })
            .collect()
    }
}

fn activity_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Activity, AppError> {
    let external_id: String = row
        .try_get("external_id")
        .map_err(|e| AppError::Database(e.to_string()))?;
    let start_raw: String = row
        .try_get("start_time")
        .map_err(|e| AppError::Database(e.to_string()))?;
    let attributes_raw: String = row
        .try_get("attributes")
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Activity {
        start_time: parse_garmin(&start_raw)
            .map_err(|e| AppError::Database(format!("Bad start_time {start_raw:?}: {e}")))?,
        attributes: serde_json::from_str(&attributes_raw)
            .map_err(|e| AppError::Database(format!("Bad attributes for {external_id}: {e}")))?,
        external_id,
    })
}
