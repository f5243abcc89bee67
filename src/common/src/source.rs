//! Collaborators that fetch raw signals from a monitoring backend.

use std::time::Duration;

use async_trait::async_trait;

use crate::model::{LogRecord, RawSeries, SampleOrder, TraceRecord};

/// Failures of a backend source, distinguishable so callers can decide
/// whether to retry, re-authenticate or give up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Credential material is missing or malformed
    #[error("credentials error: {0}")]
    Credentials(String),
    /// The client could not be constructed
    #[error("connection error: {0}")]
    Connection(String),
    /// The backend rejected our identity or permissions
    #[error("authentication error: {0}")]
    Auth(String),
    /// Timeouts, refused connections and 5xx responses
    #[error("transient network error: {0}")]
    TransientNetwork(String),
    /// Rate limit or quota exhausted
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Response body did not match the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => SourceError::Auth(message),
            429 => SourceError::QuotaExceeded(message),
            500..=599 => SourceError::TransientNetwork(format!("HTTP {status}: {message}")),
            _ => SourceError::Api { status, message },
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::TransientNetwork(_) | SourceError::QuotaExceeded(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    pub metric_type: String,
    /// Only series whose `subject_id` label equals this value
    pub subject_filter: Option<String>,
    pub lookback: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub log_name: String,
    pub lookback: Duration,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceQuery {
    pub limit: usize,
    pub lookback: Option<Duration>,
}

/// Yields every series of a metric type within a lookback window.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Order of the samples inside each returned series.
    fn order(&self) -> SampleOrder {
        SampleOrder::NewestFirst
    }

    /// Fetch all pages and return one `RawSeries` per label combination.
    async fn fetch(&self, query: &SeriesQuery) -> Result<Vec<RawSeries>, SourceError>;
}

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Most recent entries of a log, newest first.
    async fn recent(&self, query: &LogQuery) -> Result<Vec<LogRecord>, SourceError>;
}

#[async_trait]
pub trait TraceSource: Send + Sync {
    async fn recent(&self, query: &TraceQuery) -> Result<Vec<TraceRecord>, SourceError>;
}
