use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub severity: String,
    pub log_name: String,
    pub payload: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl From<gcp_api::logging::LogEntry> for LogRecord {
    fn from(entry: gcp_api::logging::LogEntry) -> Self {
        Self {
            timestamp: entry.event_time(),
            payload: entry.payload_text(),
            severity: entry.severity,
            log_name: entry.log_name,
            labels: entry.labels,
        }
    }
}
