// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Sync and activity query routes.

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityDetail};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_SYNC_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/garmin/sync", post(sync_activities))
        .route("/garmin/activities", get(list_activities))
        .route("/garmin/activities/{external_id}", get(activity_detail))
}

// ─── Sync ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SyncRequest {
    #[serde(default = "default_sync_limit")]
    limit: u32,
}

fn default_sync_limit() -> u32 {
    10
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Acquire recent activities and reconcile them into the store.
///
/// Acquisition failures are data, not transport errors: they come back as
/// `{status: "error", message}` with HTTP 200. Store failures still surface
/// as 500s.
async fn sync_activities(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    if request.limit == 0 {
        return Err(AppError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }
    let limit = request.limit.min(MAX_SYNC_LIMIT);

    tracing::info!(limit, "Sync requested");

    let acquired = match state.source.fetch_recent_activities(limit).await {
        Ok(acquired) => acquired,
        Err(e) => {
            tracing::warn!(error = %e, "Acquisition failed");
            return Ok(Json(SyncResponse {
                status: "error",
                synced_count: None,
                total_count: None,
                message: Some(e.to_string()),
            }));
        }
    };

    let result = state.sync_service.reconcile(acquired).await?;

    Ok(Json(SyncResponse {
        status: "success",
        synced_count: Some(result.synced_count),
        total_count: Some(result.total_count),
        message: None,
    }))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Maximum number of activities to return
    #[serde(default = "default_list_limit")]
    limit: u32,
}

fn default_list_limit() -> u32 {
    50
}

/// List stored activities, most recent first.
///
/// Pure read: reflects the last completed reconciliation and never triggers
/// a sync.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    if params.limit == 0 {
        return Err(AppError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }
    let limit = params.limit.min(MAX_LIST_LIMIT);

    let activities = state.store.list_activities(limit).await?;
    Ok(Json(activities))
}

/// Heart-rate detail for one activity.
///
/// Responds 404 both for unknown activities and for activities with zero
/// qualifying readings; clients only care that there is nothing to chart.
async fn activity_detail(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
) -> Result<Json<ActivityDetail>> {
    let detail = state.sync_service.project_details(&external_id).await?;

    if detail.records.is_empty() {
        return Err(AppError::NotFound(format!(
            "Activity {external_id} not found"
        )));
    }

    Ok(Json(detail))
}
