// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Reconciliation and projection semantics against the real store.
//!
//! These cover the invariants the sync core promises:
//! - upserts are idempotent and never duplicate an external ID
//! - listings come back most recent first
//! - detail projection keeps only valid readings, in timestamp order

mod common;

use common::{acquired, activity};
use lionhealth_api::db::ActivityStore;
use lionhealth_api::services::SyncService;

async fn service() -> SyncService {
    let store = ActivityStore::in_memory()
        .await
        .expect("Failed to create in-memory store");
    SyncService::new(store)
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let sync = service().await;
    let batch = vec![
        acquired(activity("1", "2025-12-01 08:00:00", "Run A"), vec![]),
        acquired(activity("2", "2025-12-02 08:00:00", "Run B"), vec![]),
    ];

    let first = sync.reconcile(batch.clone()).await.unwrap();
    let second = sync.reconcile(batch).await.unwrap();

    assert_eq!(first.synced_count, 2);
    assert_eq!(first.total_count, 2);
    assert_eq!(second.synced_count, 2);
    assert_eq!(second.total_count, 2, "repeat sync must not grow the store");
}

#[tokio::test]
async fn test_reconcile_dedup_is_last_write_wins() {
    let sync = service().await;

    sync.reconcile(vec![acquired(
        activity("42", "2025-12-01 08:00:00", "First title"),
        vec![],
    )])
    .await
    .unwrap();

    let result = sync
        .reconcile(vec![acquired(
            activity("42", "2025-12-01 08:00:00", "Second title"),
            vec![],
        )])
        .await
        .unwrap();

    assert_eq!(result.total_count, 1);

    let stored = sync.store().get_activity("42").await.unwrap().unwrap();
    assert_eq!(stored.attributes["name"], "Second title");
}

#[tokio::test]
async fn test_reconcile_empty_batch_is_noop_success() {
    let sync = service().await;

    let result = sync.reconcile(vec![]).await.unwrap();
    assert_eq!(result.synced_count, 0);
    assert_eq!(result.total_count, 0);
}

#[tokio::test]
async fn test_list_activities_is_start_time_descending() {
    let sync = service().await;
    sync.reconcile(vec![
        acquired(activity("old", "2025-11-01 06:00:00", "Oldest"), vec![]),
        acquired(activity("new", "2025-12-07 09:00:00", "Newest"), vec![]),
        acquired(activity("mid", "2025-12-01 07:30:00", "Middle"), vec![]),
    ])
    .await
    .unwrap();

    let listed = sync.store().list_activities(10).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|a| a.external_id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);

    // A smaller limit still returns the most recent ones, in order.
    let top_two = sync.store().list_activities(2).await.unwrap();
    let ids: Vec<&str> = top_two.iter().map(|a| a.external_id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid"]);
}

#[tokio::test]
async fn test_sync_counts_with_overlap() {
    let sync = service().await;

    // Two activities already stored from an earlier sync.
    sync.reconcile(vec![
        acquired(activity("1", "2025-12-01 08:00:00", "A"), vec![]),
        acquired(activity("2", "2025-12-02 08:00:00", "B"), vec![]),
    ])
    .await
    .unwrap();

    // A limit=5 sync re-observes both plus three new ones.
    let result = sync
        .reconcile(vec![
            acquired(activity("1", "2025-12-01 08:00:00", "A"), vec![]),
            acquired(activity("2", "2025-12-02 08:00:00", "B"), vec![]),
            acquired(activity("3", "2025-12-03 08:00:00", "C"), vec![]),
            acquired(activity("4", "2025-12-04 08:00:00", "D"), vec![]),
            acquired(activity("5", "2025-12-05 08:00:00", "E"), vec![]),
        ])
        .await
        .unwrap();

    assert_eq!(result.synced_count, 5);
    assert_eq!(result.total_count, 5, "prior total 2 + 3 new");
}

#[tokio::test]
async fn test_detail_projection_filters_invalid_readings() {
    let sync = service().await;

    sync.reconcile(vec![acquired(
        activity("7", "2025-12-07 09:27:00", "Intervals"),
        vec![
            ("2025-12-07 09:27:35", None),
            ("2025-12-07 09:27:36", Some(0)),
            ("2025-12-07 09:27:37", Some(-1)),
            ("2025-12-07 09:27:38", Some(55)),
            ("2025-12-07 09:27:39", Some(60)),
        ],
    )])
    .await
    .unwrap();

    let detail = sync.project_details("7").await.unwrap();
    let readings: Vec<i64> = detail.records.iter().map(|r| r.hr).collect();
    assert_eq!(readings, vec![55, 60]);
    assert!(detail.records[0].timestamp < detail.records[1].timestamp);
}

#[tokio::test]
async fn test_detail_projection_unknown_activity_is_empty() {
    let sync = service().await;

    let detail = sync.project_details("does-not-exist").await.unwrap();
    assert!(detail.records.is_empty());
}

#[tokio::test]
async fn test_repeated_sync_does_not_duplicate_samples() {
    let sync = service().await;
    let batch = vec![acquired(
        activity("9", "2025-12-07 09:00:00", "Ride"),
        vec![
            ("2025-12-07 09:00:01", Some(100)),
            ("2025-12-07 09:00:02", Some(101)),
        ],
    )];

    sync.reconcile(batch.clone()).await.unwrap();
    sync.reconcile(batch).await.unwrap();

    let detail = sync.project_details("9").await.unwrap();
    assert_eq!(detail.records.len(), 2);
}
