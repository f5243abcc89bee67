use serde::{Deserialize, Serialize};

use super::span::SpanRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub project_id: String,
    pub trace_id: String,
    pub spans: Vec<SpanRecord>,
}

impl TraceRecord {
    /// The span without a parent, or the earliest span when the root was not returned.
    pub fn root_span(&self) -> Option<&SpanRecord> {
        self.spans
            .iter()
            .find(|s| s.is_root())
            .or_else(|| self.spans.iter().min_by_key(|s| s.start))
    }

    /// Wall time from the first span start to the last span end.
    pub fn duration_ms(&self) -> i64 {
        let start = self.spans.iter().map(|s| s.start).min();
        let end = self.spans.iter().map(|s| s.end).max();
        match (start, end) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => 0,
        }
    }
}

impl From<gcp_api::trace::Trace> for TraceRecord {
    fn from(trace: gcp_api::trace::Trace) -> Self {
        Self {
            project_id: trace.project_id,
            trace_id: trace.trace_id,
            spans: trace.spans.into_iter().map(SpanRecord::from).collect(),
        }
    }
}
