//! Configuration types for download-sync

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the dispatcher and its persistent store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file (default: "./downloads.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Number of records fetched per batch when listing durable downloads
    /// (default: 100)
    #[serde(default = "default_list_batch_size")]
    pub list_batch_size: usize,

    /// Event broadcast channel capacity; subscribers that lag behind by more
    /// than this many events receive `RecvError::Lagged` (default: 1000)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            list_batch_size: default_list_batch_size(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./downloads.db")
}

fn default_list_batch_size() -> usize {
    100
}

fn default_event_capacity() -> usize {
    1000
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.database_path, PathBuf::from("./downloads.db"));
        assert_eq!(config.list_batch_size, 100);
        assert_eq!(config.event_capacity, 1000);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.list_batch_size, 100);
        assert_eq!(config.event_capacity, 1000);
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"database_path": "/tmp/dl.db", "list_batch_size": 7}"#)
                .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/dl.db"));
        assert_eq!(config.list_batch_size, 7);
        assert_eq!(config.event_capacity, 1000, "unset field keeps its default");
    }
}
