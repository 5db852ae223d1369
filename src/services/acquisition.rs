// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Acquisition strategies for Garmin activity data.
//!
//! One normalized contract, two interchangeable implementations selected at
//! startup:
//! - [`DirectSource`] polls the Garmin Connect API using a held session.
//! - [`DelegatedSource`] runs the GarminDb batch importer, then reads the
//!   local database the importer wrote.
//!
//! Each strategy owns its own mapping from underlying faults to
//! [`AcquisitionError`]; callers never see raw transport or process errors.

use crate::error::AppError;
use crate::models::{AcquiredActivity, Activity, SensorSample};
use crate::services::garmin::{GarminClient, SessionHandle};
use crate::time_utils::parse_garmin;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};

/// Failures surfaced by an acquisition strategy.
///
/// A missing backing store is deliberately *not* represented here: structural
/// absence is an empty-result success, not an error.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Not authenticated with Garmin Connect")]
    NotAuthenticated,

    #[error("Garmin API error: {0}")]
    Api(String),

    #[error("Import process failed: {0}")]
    Import(String),

    #[error("Import database error: {0}")]
    ImportDb(String),
}

/// A source of recently recorded activities.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch the `limit` most recent activities, with whatever sensor
    /// samples the strategy can provide.
    async fn fetch_recent_activities(
        &self,
        limit: u32,
    ) -> Result<Vec<AcquiredActivity>, AcquisitionError>;
}

// ─── Direct Strategy ─────────────────────────────────────────

/// Fetch activities straight from the Garmin Connect API.
pub struct DirectSource {
    client: GarminClient,
    session: SessionHandle,
}

impl DirectSource {
    pub fn new(client: GarminClient, session: SessionHandle) -> Self {
        Self { client, session }
    }
}

#[async_trait]
impl ActivitySource for DirectSource {
    async fn fetch_recent_activities(
        &self,
        limit: u32,
    ) -> Result<Vec<AcquiredActivity>, AcquisitionError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(AcquisitionError::NotAuthenticated)?;

        let activities = self
            .client
            .list_activities(session, limit)
            .await
            .map_err(api_error)?;

        tracing::debug!(count = activities.len(), "Fetched activities from Garmin");

        let mut acquired = Vec::with_capacity(activities.len());
        for activity in activities {
            // A failed detail fetch downgrades to an activity without
            // samples rather than failing the whole sync.
            let samples = match self
                .client
                .get_heart_rate_series(session, &activity.external_id)
                .await
            {
                Ok(samples) => samples,
                Err(e) => {
                    tracing::warn!(
                        activity_id = %activity.external_id,
                        error = %e,
                        "Could not fetch heart-rate series"
                    );
                    Vec::new()
                }
            };

            acquired.push(AcquiredActivity { activity, samples });
        }

        Ok(acquired)
    }
}

fn api_error(err: AppError) -> AcquisitionError {
    AcquisitionError::Api(err.to_string())
}

// ─── Delegated Strategy ──────────────────────────────────────

/// Acquire activities by running the GarminDb importer and reading back the
/// database it maintains.
///
/// The import step is a blocking, opaque external process: no partial
/// progress, no cancellation. Acquisition and retrieval are decoupled in
/// this mode; if the importer silently no-ops, the read returns whatever
/// state the database was already in.
pub struct DelegatedSource {
    import_command: Option<String>,
    db_path: PathBuf,
}

impl DelegatedSource {
    pub fn new(import_command: Option<String>, db_path: PathBuf) -> Self {
        Self {
            import_command,
            db_path,
        }
    }

    /// Run the configured import command to completion.
    async fn run_import(&self) -> Result<(), AcquisitionError> {
        let Some(command) = &self.import_command else {
            tracing::debug!("No import command configured; reading existing GarminDb state");
            return Ok(());
        };

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AcquisitionError::Import("Empty import command".to_string()))?;

        tracing::info!(command = %command, "Running GarminDb import");

        let output = tokio::process::Command::new(program)
            .args(parts)
            .output()
            .await
            .map_err(|e| AcquisitionError::Import(format!("Failed to spawn {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquisitionError::Import(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::info!("GarminDb import finished");
        Ok(())
    }
}

#[async_trait]
impl ActivitySource for DelegatedSource {
    async fn fetch_recent_activities(
        &self,
        limit: u32,
    ) -> Result<Vec<AcquiredActivity>, AcquisitionError> {
        self.run_import().await?;
        read_garmindb_activities(&self.db_path, limit).await
    }
}

/// Read the most recent activities from a GarminDb activities database.
///
/// A missing database file is structural absence: the importer has never
/// run. That yields an empty list, not an error.
pub async fn read_garmindb_activities(
    db_path: &Path,
    limit: u32,
) -> Result<Vec<AcquiredActivity>, AcquisitionError> {
    if !db_path.exists() {
        tracing::info!(path = %db_path.display(), "GarminDb database not present; nothing to read");
        return Ok(Vec::new());
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| AcquisitionError::ImportDb(e.to_string()))?;

    let result = read_from_pool(&pool, limit).await;
    pool.close().await;
    result
}

async fn read_from_pool(
    pool: &Pool<Sqlite>,
    limit: u32,
) -> Result<Vec<AcquiredActivity>, AcquisitionError> {
    let rows = sqlx::query(
        r"
        SELECT activity_id, name, start_time, sport, distance, avg_hr
        FROM activities
        ORDER BY start_time DESC
        LIMIT $1
        ",
    )
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await
    .map_err(|e| AcquisitionError::ImportDb(e.to_string()))?;

    let mut acquired = Vec::with_capacity(rows.len());
    for row in rows {
        let activity = garmindb_activity(&row)?;

        let sample_rows = sqlx::query(
            r"
            SELECT timestamp, hr
            FROM activity_records
            WHERE activity_id = $1
            ORDER BY timestamp ASC
            ",
        )
        .bind(&activity.external_id)
        .fetch_all(pool)
        .await
        .map_err(|e| AcquisitionError::ImportDb(e.to_string()))?;

        let samples = sample_rows
            .iter()
            .map(garmindb_sample)
            .collect::<Result<Vec<_>, _>>()?;

        acquired.push(AcquiredActivity { activity, samples });
    }

    Ok(acquired)
}

fn garmindb_activity(row: &sqlx::sqlite::SqliteRow) -> Result<Activity, AcquisitionError> {
    let db_err = |e: sqlx::Error| AcquisitionError::ImportDb(e.to_string());

    let external_id: String = row.try_get("activity_id").map_err(db_err)?;
    let start_raw: String = row.try_get("start_time").map_err(db_err)?;
    let start_time = parse_garmin(&start_raw).map_err(|e| {
        AcquisitionError::ImportDb(format!("Bad start_time for {external_id}: {e}"))
    })?;

    let mut attributes = serde_json::Map::new();
    if let Some(name) = row.try_get::<Option<String>, _>("name").map_err(db_err)? {
        attributes.insert("name".to_string(), name.into());
    }
    if let Some(sport) = row.try_get::<Option<String>, _>("sport").map_err(db_err)? {
        attributes.insert("sport".to_string(), sport.into());
    }
    if let Some(distance) = row.try_get::<Option<f64>, _>("distance").map_err(db_err)? {
        attributes.insert("distance".to_string(), distance.into());
    }
    if let Some(avg_hr) = row.try_get::<Option<f64>, _>("avg_hr").map_err(db_err)? {
        attributes.insert("avg_hr".to_string(), avg_hr.into());
    }

    Ok(Activity {
        external_id,
        start_time,
        attributes,
    })
}

fn garmindb_sample(row: &sqlx::sqlite::SqliteRow) -> Result<SensorSample, AcquisitionError> {
    let db_err = |e: sqlx::Error| AcquisitionError::ImportDb(e.to_string());

    let raw: String = row.try_get("timestamp").map_err(db_err)?;
    let value: Option<i64> = row.try_get("hr").map_err(db_err)?;

    Ok(SensorSample {
        timestamp: parse_garmin(&raw)
            .map_err(|e| AcquisitionError::ImportDb(format!("Bad record timestamp: {e}")))?,
        value,
    })
}
