// SPDX-License-Identifier: MIT
// Copyright 2026 LionHealth Authors

//! Shared helpers for Garmin timestamp formatting.
//!
//! Garmin Connect and GarminDb both use local naive timestamps of the form
//! `2025-12-07 09:27:35.000000`. We store and serve the same representation,
//! which keeps lexicographic and chronological order identical.

use chrono::NaiveDateTime;

/// Format used by Garmin for local timestamps.
pub const GARMIN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format a timestamp in Garmin's local-time representation.
pub fn format_garmin(ts: NaiveDateTime) -> String {
    ts.format(GARMIN_TIME_FORMAT).to_string()
}

/// Parse a Garmin local timestamp, with or without fractional seconds.
pub fn parse_garmin(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
}

/// Serde adapter for fields carried in Garmin's timestamp format.
pub mod serde_garmin {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&super::format_garmin(*ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(de)?;
        super::parse_garmin(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let ts = parse_garmin("2025-12-07 09:27:35.000000").unwrap();
        assert_eq!(format_garmin(ts), "2025-12-07 09:27:35.000000");
    }

    #[test]
    fn test_parse_without_fraction() {
        let ts = parse_garmin("2025-12-07 09:27:35").unwrap();
        assert_eq!(format_garmin(ts), "2025-12-07 09:27:35.000000");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_garmin("not-a-date").is_err());
    }
}
