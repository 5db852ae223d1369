// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

use lionhealth_api::config::Config;
use lionhealth_api::db::ActivityStore;
use lionhealth_api::models::{AcquiredActivity, Activity, SensorSample};
use lionhealth_api::routes::create_router;
use lionhealth_api::services::{
    ActivitySource, DelegatedSource, GarminAuth, GarminClient, SessionHandle, SyncService,
};
use lionhealth_api::time_utils::parse_garmin;
use lionhealth_api::AppState;
use std::sync::Arc;

/// Create a test app backed by an in-memory store and a delegated source
/// pointing at a nonexistent GarminDb database (structural absence).
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let store = ActivityStore::in_memory()
        .await
        .expect("Failed to create in-memory store");

    let client = GarminClient::new(config.garmin_base_url.clone());
    let session: SessionHandle = Arc::new(tokio::sync::RwLock::new(None));
    let auth = GarminAuth::new(
        client.clone(),
        session.clone(),
        config.garmindb_config_path.clone(),
    );

    let source: Box<dyn ActivitySource> =
        Box::new(DelegatedSource::new(None, config.garmindb_db_path.clone()));
    let sync_service = SyncService::new(store.clone());

    let state = Arc::new(AppState {
        config,
        store,
        auth,
        source,
        sync_service,
    });

    (create_router(state.clone()), state)
}

/// Build an activity with the given ID, start time, and name attribute.
#[allow(dead_code)]
pub fn activity(external_id: &str, start_time: &str, name: &str) -> Activity {
    let mut attributes = serde_json::Map::new();
    attributes.insert("name".to_string(), name.into());

    Activity {
        external_id: external_id.to_string(),
        start_time: parse_garmin(start_time).expect("valid test timestamp"),
        attributes,
    }
}

/// Wrap an activity with sensor samples as an acquisition result.
#[allow(dead_code)]
pub fn acquired(activity: Activity, samples: Vec<(&str, Option<i64>)>) -> AcquiredActivity {
    let samples = samples
        .into_iter()
        .map(|(ts, value)| SensorSample {
            timestamp: parse_garmin(ts).expect("valid test timestamp"),
            value,
        })
        .collect();

    AcquiredActivity { activity, samples }
}
