// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Services module - business logic layer.

pub mod acquisition;
pub mod garmin;
pub mod sync;

pub use acquisition::{ActivitySource, DelegatedSource, DirectSource};
pub use garmin::{GarminAuth, GarminClient, GarminSession, SessionHandle};
pub use sync::{ReconcileResult, SyncService};
