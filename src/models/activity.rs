// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Activity and sensor-sample models for storage and API.

use crate::time_utils::serde_garmin;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Stored activity record.
///
/// `attributes` is the remote service's payload passed through verbatim
/// (name, sport, distance, avg_hr, ...). It is serialized flattened, so API
/// responses expose those fields at the top level next to `activity_id` —
/// the shape the iOS client decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Garmin activity ID; the dedup key
    #[serde(rename = "activity_id")]
    pub external_id: String,
    /// Start of the session in Garmin local time; default sort key
    #[serde(with = "serde_garmin")]
    pub start_time: NaiveDateTime,
    /// Open pass-through payload, never interpreted by the core
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One raw per-timestamp measurement belonging to an activity.
///
/// `value` may be absent or non-positive, meaning "no reading".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSample {
    #[serde(with = "serde_garmin")]
    pub timestamp: NaiveDateTime,
    pub value: Option<i64>,
}

/// An activity as produced by an acquisition strategy: the record itself
/// plus whatever sensor samples the strategy could provide.
#[derive(Debug, Clone)]
pub struct AcquiredActivity {
    pub activity: Activity,
    pub samples: Vec<SensorSample>,
}

/// Filtered, ordered heart-rate view served for one activity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityDetail {
    pub activity_id: String,
    pub records: Vec<DetailRecord>,
}

/// One qualifying heart-rate reading.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRecord {
    #[serde(with = "serde_garmin")]
    pub timestamp: NaiveDateTime,
    pub hr: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_garmin;

    #[test]
    fn test_activity_serializes_flattened() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("name".to_string(), serde_json::json!("Morning Run"));
        attributes.insert("avg_hr".to_string(), serde_json::json!(142));

        let activity = Activity {
            external_id: "12345".to_string(),
            start_time: parse_garmin("2025-12-07 09:27:35").unwrap(),
            attributes,
        };

        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["activity_id"], "12345");
        assert_eq!(value["start_time"], "2025-12-07 09:27:35.000000");
        assert_eq!(value["name"], "Morning Run");
        assert_eq!(value["avg_hr"], 142);
    }

    #[test]
    fn test_activity_round_trips_through_json() {
        let json = serde_json::json!({
            "activity_id": "987",
            "start_time": "2025-11-01 06:00:00.000000",
            "sport": "cycling",
            "distance": 24_140.2,
        });

        let activity: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(activity.external_id, "987");
        assert_eq!(activity.attributes["sport"], "cycling");
        assert!(!activity.attributes.contains_key("activity_id"));
    }
}
