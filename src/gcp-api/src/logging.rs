//! Cloud Logging API v2 (`entries.list`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitoring::MonitoredResource;

/// Sort order accepted by `entries.list`.
pub const NEWEST_FIRST: &str = "timestamp desc";

/// Body of `POST /v2/entries:list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogEntriesRequest {
    pub resource_names: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub order_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogEntriesResponse {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
    #[serde(default)]
    pub next_page_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub log_name: String,
    #[serde(default)]
    pub resource: Option<MonitoredResource>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub receive_timestamp: Option<DateTime<Utc>>,
    #[serde(default = "default_severity")]
    pub severity: String,
    #[serde(default)]
    pub insert_id: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto_payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

fn default_severity() -> String {
    "DEFAULT".to_string()
}

impl LogEntry {
    /// Flatten whichever payload is set into a single line of text.
    pub fn payload_text(&self) -> String {
        if let Some(text) = &self.text_payload {
            return text.clone();
        }
        self.json_payload
            .as_ref()
            .or(self.proto_payload.as_ref())
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// Event time, falling back to the time the backend received the entry.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp.or(self.receive_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entries() {
        let resp: ListLogEntriesResponse = serde_json::from_str(
            r#"{
              "entries": [
                {
                  "logName": "projects/demo/logs/app",
                  "timestamp": "2024-05-01T10:00:00.123Z",
                  "severity": "ERROR",
                  "insertId": "x1",
                  "textPayload": "boom"
                },
                {
                  "logName": "projects/demo/logs/app",
                  "receiveTimestamp": "2024-05-01T09:59:00Z",
                  "jsonPayload": { "msg": "hi" }
                }
              ],
              "nextPageToken": "t2"
            }"#,
        )
        .unwrap();

        assert_eq!(resp.entries.len(), 2);
        assert_eq!(resp.next_page_token, "t2");
        assert_eq!(resp.entries[0].severity, "ERROR");
        assert_eq!(resp.entries[0].payload_text(), "boom");
        assert_eq!(resp.entries[1].severity, "DEFAULT");
        assert_eq!(resp.entries[1].payload_text(), r#"{"msg":"hi"}"#);
        assert!(resp.entries[1].timestamp.is_none());
        assert!(resp.entries[1].event_time().is_some());
    }

    #[test]
    fn test_request_skips_unset_fields() {
        let req = ListLogEntriesRequest {
            resource_names: vec!["projects/demo".to_string()],
            order_by: NEWEST_FIRST.to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["resourceNames"][0], "projects/demo");
        assert_eq!(json["orderBy"], "timestamp desc");
        assert!(json.get("filter").is_none());
        assert!(json.get("pageToken").is_none());
    }
}
