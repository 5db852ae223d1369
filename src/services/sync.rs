// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Reconciliation and detail projection over the activity store.
//!
//! Reconciliation upserts acquired activities keyed by external ID, so
//! repeated or overlapping syncs converge on the same stored state. Detail
//! projection derives the heart-rate view: valid readings only, timestamp
//! ascending.

use crate::db::ActivityStore;
use crate::error::Result;
use crate::models::{AcquiredActivity, ActivityDetail, DetailRecord, SensorSample};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileResult {
    /// Activities processed in this call (inserts and updates alike)
    pub synced_count: u32,
    /// Store cardinality after reconciliation
    pub total_count: u64,
}

/// Merges acquired activities into the store and serves derived views.
#[derive(Clone)]
pub struct SyncService {
    store: ActivityStore,
}

impl SyncService {
    pub fn new(store: ActivityStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    /// Upsert a batch of acquired activities.
    ///
    /// Idempotent: reconciling the same batch twice leaves the store in the
    /// same state as once. An empty batch is a no-op success; a sync that
    /// finds nothing new is still a sync.
    pub async fn reconcile(&self, acquired: Vec<AcquiredActivity>) -> Result<ReconcileResult> {
        let synced_count = acquired.len() as u32;

        for item in acquired {
            self.store.upsert_activity(&item.activity).await?;
            if !item.samples.is_empty() {
                self.store
                    .upsert_samples(&item.activity.external_id, &item.samples)
                    .await?;
            }
        }

        let total_count = self.store.count_activities().await?;

        tracing::info!(synced_count, total_count, "Reconciliation complete");

        Ok(ReconcileResult {
            synced_count,
            total_count,
        })
    }

    /// Project the filtered heart-rate detail view for one activity.
    ///
    /// An unknown activity and an activity with no qualifying readings both
    /// come back with empty `records`; the route layer turns that into 404.
    pub async fn project_details(&self, external_id: &str) -> Result<ActivityDetail> {
        let samples = self.store.get_samples(external_id).await?;

        Ok(ActivityDetail {
            activity_id: external_id.to_string(),
            records: filter_valid_readings(samples),
        })
    }
}

/// Keep only strictly positive readings; absent or non-positive values mean
/// "no reading", not "a reading of zero". Input order is preserved.
fn filter_valid_readings(samples: Vec<SensorSample>) -> Vec<DetailRecord> {
    samples
        .into_iter()
        .filter_map(|s| {
            let hr = s.value?;
            (hr > 0).then_some(DetailRecord {
                timestamp: s.timestamp,
                hr,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_garmin;

    fn sample(ts: &str, value: Option<i64>) -> SensorSample {
        SensorSample {
            timestamp: parse_garmin(ts).unwrap(),
            value,
        }
    }

    #[test]
    fn test_filter_drops_missing_and_non_positive() {
        let samples = vec![
            sample("2025-12-07 09:27:35", None),
            sample("2025-12-07 09:27:36", Some(0)),
            sample("2025-12-07 09:27:37", Some(-1)),
            sample("2025-12-07 09:27:38", Some(55)),
            sample("2025-12-07 09:27:39", Some(60)),
        ];

        let records = filter_valid_readings(samples);
        let readings: Vec<i64> = records.iter().map(|r| r.hr).collect();
        assert_eq!(readings, vec![55, 60]);
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn test_filter_empty_input() {
        assert!(filter_valid_readings(Vec::new()).is_empty());
    }
}
