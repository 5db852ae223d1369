// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! LionHealth backend: sync Garmin activities into a local store.
//!
//! Activities are acquired either directly from the Garmin Connect API or
//! by delegating to the GarminDb batch importer, then reconciled into a
//! SQLite store that serves time-ordered listings and filtered heart-rate
//! detail views.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::ActivityStore;
use services::{ActivitySource, GarminAuth, SyncService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: ActivityStore,
    pub auth: GarminAuth,
    /// Acquisition strategy, selected once at startup
    pub source: Box<dyn ActivitySource>,
    pub sync_service: SyncService,
}
