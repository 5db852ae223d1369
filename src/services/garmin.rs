// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Garmin Connect API client and authentication state.
//!
//! Handles:
//! - Credential login and the resulting session handle
//! - Recent-activity listing (offset 0, remote order)
//! - Per-activity heart-rate series fetch
//! - Heuristic "configured" check for the GarminDb import path
//!
//! The session is held explicitly as `Option<GarminSession>` behind a lock
//! shared with the direct acquisition source, never as implicit global state.

use crate::error::AppError;
use crate::models::{Activity, SensorSample};
use crate::time_utils::parse_garmin;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An authenticated Garmin Connect session.
#[derive(Debug, Clone)]
pub struct GarminSession {
    pub access_token: String,
    pub display_name: Option<String>,
}

/// Shared handle to the (possibly absent) session.
pub type SessionHandle = Arc<RwLock<Option<GarminSession>>>;

/// Garmin Connect API client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    base_url: String,
}

impl GarminClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<GarminSession, AppError> {
        let url = format!("{}/auth/login", self.base_url);

        let body = serde_json::json!({
            "username": email,
            "password": password,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        let login: LoginResult = check_response_json(response).await?;

        Ok(GarminSession {
            access_token: login.access_token,
            display_name: None,
        })
    }

    /// Fetch the authenticated user's full name.
    pub async fn get_full_name(&self, session: &GarminSession) -> Result<String, AppError> {
        let url = format!("{}/userprofile-service/socialProfile", self.base_url);
        let profile: SocialProfile = self.get_json(&url, session).await?;
        Ok(profile.full_name)
    }

    /// List the `limit` most recent activities, starting at offset zero,
    /// in the order the service returns them.
    pub async fn list_activities(
        &self,
        session: &GarminSession,
        limit: u32,
    ) -> Result<Vec<Activity>, AppError> {
        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.base_url
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(&[("start", "0".to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        let raw: Vec<serde_json::Map<String, serde_json::Value>> =
            check_response_json(response).await?;

        raw.into_iter().map(activity_from_remote).collect()
    }

    /// Fetch the heart-rate time series for one activity.
    pub async fn get_heart_rate_series(
        &self,
        session: &GarminSession,
        external_id: &str,
    ) -> Result<Vec<SensorSample>, AppError> {
        let url = format!(
            "{}/activity-service/activity/{}/hr",
            self.base_url, external_id
        );
        let series: HrSeries = self.get_json(&url, session).await?;

        series
            .records
            .into_iter()
            .map(|r| {
                Ok(SensorSample {
                    timestamp: parse_garmin(&r.timestamp)
                        .map_err(|e| AppError::GarminApi(format!("Bad HR timestamp: {e}")))?,
                    value: r.heart_rate,
                })
            })
            .collect()
    }

    /// Generic authenticated GET with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        session: &GarminSession,
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 401 {
            return Err(AppError::GarminApi("Session rejected (401)".to_string()));
        }

        return Err(AppError::GarminApi(format!("HTTP {status}: {body}")));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::GarminApi(format!("Invalid response body: {e}")))
}

/// Convert a raw remote activity object into our stored shape.
///
/// Only `activityId` and `startTimeLocal` are interpreted; everything else
/// rides along untouched in `attributes`.
fn activity_from_remote(
    mut raw: serde_json::Map<String, serde_json::Value>,
) -> Result<Activity, AppError> {
    let external_id = match raw.remove("activityId") {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => {
            return Err(AppError::GarminApi(
                "Activity missing activityId".to_string(),
            ))
        }
    };

    let start_raw = raw
        .remove("startTimeLocal")
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| {
            AppError::GarminApi(format!("Activity {external_id} missing startTimeLocal"))
        })?;

    let start_time = parse_garmin(&start_raw).map_err(|e| {
        AppError::GarminApi(format!("Activity {external_id} bad startTimeLocal: {e}"))
    })?;

    Ok(Activity {
        external_id,
        start_time,
        attributes: raw,
    })
}

// ─── Auth State Tracker ──────────────────────────────────────

/// Tracks whether the system is authorized to acquire data.
#[derive(Clone)]
pub struct GarminAuth {
    client: GarminClient,
    session: SessionHandle,
    garmindb_config_path: PathBuf,
}

impl GarminAuth {
    pub fn new(client: GarminClient, session: SessionHandle, garmindb_config_path: PathBuf) -> Self {
        Self {
            client,
            session,
            garmindb_config_path,
        }
    }

    /// Attempt a credential login. All failure modes collapse to `false`
    /// with a logged diagnostic; on success the session handle is populated
    /// and the user's display name is returned when available.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let mut session = match self.client.login(email, password).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Garmin login failed");
                return false;
            }
        };

        // Best effort; a missing profile name must not fail the login.
        match self.client.get_full_name(&session).await {
            Ok(name) => session.display_name = Some(name),
            Err(e) => tracing::debug!(error = %e, "Could not fetch Garmin profile name"),
        }

        *self.session.write().await = Some(session);
        tracing::info!("Garmin login successful");
        true
    }

    /// Heuristic readiness check: does the GarminDb config artifact exist?
    ///
    /// A `true` result means "likely ready", not "verified": the file may
    /// hold stale or invalid credentials. Callers must not assume a
    /// subsequent acquisition will succeed.
    pub fn check_configured(&self) -> bool {
        self.garmindb_config_path.exists()
    }

    /// Display name from the held session, if any.
    pub async fn display_name(&self) -> Option<String> {
        self.session.read().await.as_ref()?.display_name.clone()
    }
}

#[derive(Deserialize)]
struct LoginResult {
    access_token: String,
}

#[derive(Deserialize)]
struct SocialProfile {
    #[serde(rename = "fullName")]
    full_name: String,
}

#[derive(Deserialize)]
struct HrSeries {
    records: Vec<HrRecord>,
}

#[derive(Deserialize)]
struct HrRecord {
    timestamp: String,
    #[serde(rename = "heartRate")]
    heart_rate: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_from_remote_extracts_keys() {
        let raw = serde_json::json!({
            "activityId": 19724001234_u64,
            "startTimeLocal": "2025-12-07 09:27:35",
            "activityName": "Morning Run",
            "distance": 5012.3,
        });
        let serde_json::Value::Object(map) = raw else {
            unreachable!()
        };

        let activity = activity_from_remote(map).unwrap();
        assert_eq!(activity.external_id, "19724001234");
        assert_eq!(activity.attributes["activityName"], "Morning Run");
        assert!(!activity.attributes.contains_key("activityId"));
        assert!(!activity.attributes.contains_key("startTimeLocal"));
    }

    #[test]
    fn test_activity_from_remote_requires_id() {
        let serde_json::Value::Object(map) =
            serde_json::json!({"startTimeLocal": "2025-12-07 09:27:35"})
        else {
            unreachable!()
        };
        assert!(activity_from_remote(map).is_err());
    }
}
