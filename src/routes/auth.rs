// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Garmin authentication routes.

use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/garmin/auth/login", post(login))
        .route("/garmin/auth/status", post(auth_status))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Log in to Garmin Connect with credentials.
///
/// Never fails at the HTTP level: invalid credentials, network faults and
/// anything unexpected all collapse to `success: false`.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Json<LoginResponse> {
    if state.auth.login(&request.email, &request.password).await {
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            display_name: state.auth.display_name().await,
        })
    } else {
        Json(LoginResponse {
            success: false,
            message: "Invalid credentials".to_string(),
            display_name: None,
        })
    }
}

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub configured: bool,
}

/// Report whether the GarminDb config artifacts are present.
///
/// This is a heuristic presence check only; `configured: true` does not
/// mean the stored credentials still work.
async fn auth_status(State(state): State<Arc<AppState>>) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        configured: state.auth.check_configured(),
    })
}
