//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup. The GarminDb paths default to the
//! locations the import tool uses out of the box (`~/.GarminDb`,
//! `~/.HealthData/DBs`).

use std::env;
use std::path::PathBuf;

/// How activities are acquired from Garmin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionMode {
    /// Authenticated polling of the Garmin Connect API.
    Direct,
    /// Run the GarminDb batch importer, then read its local database.
    Delegated,
}

impl std::str::FromStr for AcquisitionMode {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "delegated" | "garmindb" => Ok(Self::Delegated),
            _ => Err(ConfigError::Invalid("ACQUISITION_MODE")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// SQLite URL for the activity store
    pub database_url: String,
    /// Which acquisition strategy to use
    pub acquisition_mode: AcquisitionMode,
    /// Garmin Connect API base URL
    pub garmin_base_url: String,
    /// GarminDb credentials/config file (presence = "configured")
    pub garmindb_config_path: PathBuf,
    /// GarminDb activities database written by the importer
    pub garmindb_db_path: PathBuf,
    /// Command to run the GarminDb importer; `None` skips the import step
    /// (useful when a cron job runs it out of band)
    pub garmindb_import_command: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let acquisition_mode = env::var("ACQUISITION_MODE")
            .unwrap_or_else(|_| "direct".to_string())
            .parse()?;

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/lionhealth.db".to_string()),
            acquisition_mode,
            garmin_base_url: env::var("GARMIN_API_BASE_URL")
                .unwrap_or_else(|_| "https://connectapi.garmin.com".to_string()),
            garmindb_config_path: env::var("GARMINDB_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    PathBuf::from(&home).join(".GarminDb/GarminConnectConfig.json")
                }),
            garmindb_db_path: env::var("GARMINDB_ACTIVITIES_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    PathBuf::from(&home).join(".HealthData/DBs/garmin_activities.db")
                }),
            garmindb_import_command: env::var("GARMINDB_IMPORT_COMMAND")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            frontend_url: "http://localhost:5173".to_string(),
            database_url: "sqlite::memory:".to_string(),
            acquisition_mode: AcquisitionMode::Delegated,
            garmin_base_url: "http://127.0.0.1:9".to_string(),
            garmindb_config_path: PathBuf::from("/nonexistent/GarminConnectConfig.json"),
            garmindb_db_path: PathBuf::from("/nonexistent/garmin_activities.db"),
            garmindb_import_command: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
