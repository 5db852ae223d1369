// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Data models for the application.

pub mod activity;

pub use activity::{AcquiredActivity, Activity, ActivityDetail, DetailRecord, SensorSample};
