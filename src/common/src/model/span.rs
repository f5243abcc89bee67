use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    Unspecified,
    Server,
    Client,
}

impl SpanKind {
    /// Parse the Cloud Trace v1 kind names.
    pub fn from_str(s: &str) -> Self {
        match s {
            "RPC_SERVER" => SpanKind::Server,
            "RPC_CLIENT" => SpanKind::Client,
            _ => SpanKind::Unspecified,
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            SpanKind::Unspecified => "Unspecified",
            SpanKind::Server => "Server",
            SpanKind::Client => "Client",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub name: String,
    pub kind: SpanKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SpanRecord {
    pub fn is_root(&self) -> bool {
        self.parent_span_id
            .as_deref()
            .is_none_or(|parent| parent.is_empty() || parent == "0")
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }
}

impl From<gcp_api::trace::TraceSpan> for SpanRecord {
    fn from(span: gcp_api::trace::TraceSpan) -> Self {
        Self {
            kind: SpanKind::from_str(&span.kind),
            span_id: span.span_id,
            parent_span_id: span.parent_span_id,
            name: span.name,
            start: span.start_time,
            end: span.end_time,
        }
    }
}
