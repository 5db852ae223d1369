// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! LionHealth API Server
//!
//! Synchronizes Garmin activity data into a local SQLite store and serves
//! activity listings and heart-rate detail views to the app.

use lionhealth_api::{
    config::{AcquisitionMode, Config},
    db::ActivityStore,
    services::{
        ActivitySource, DelegatedSource, DirectSource, GarminAuth, GarminClient, SessionHandle,
        SyncService,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, mode = ?config.acquisition_mode, "Starting LionHealth API");

    // Open the activity store
    let store = ActivityStore::connect(&config.database_url)
        .await
        .expect("Failed to open activity store");

    // Garmin client and explicitly held session state
    let client = GarminClient::new(config.garmin_base_url.clone());
    let session: SessionHandle = Arc::new(tokio::sync::RwLock::new(None));

    let auth = GarminAuth::new(
        client.clone(),
        session.clone(),
        config.garmindb_config_path.clone(),
    );

    // Select the acquisition strategy once, at startup
    let source: Box<dyn ActivitySource> = match config.acquisition_mode {
        AcquisitionMode::Direct => Box::new(DirectSource::new(client, session)),
        AcquisitionMode::Delegated => Box::new(DelegatedSource::new(
            config.garmindb_import_command.clone(),
            config.garmindb_db_path.clone(),
        )),
    };

    let sync_service = SyncService::new(store.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        auth,
        source,
        sync_service,
    });

    // Build router
    let app = lionhealth_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lionhealth_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
