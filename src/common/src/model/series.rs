use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SUBJECT_ID_LABEL: &str = "subject_id";
pub const SUBJECT_TYPE_LABEL: &str = "subject_type";

/// Order in which a sample sequence is handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrder {
    OldestFirst,
    NewestFirst,
}

/// One observation as reported by the backend.
///
/// `value` is a running total for the window starting at `interval_start`;
/// several consecutive samples may report on the same, still open, window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSample {
    pub interval_start: DateTime<Utc>,
    pub interval_end: DateTime<Utc>,
    pub value: i64,
    pub labels: BTreeMap<String, String>,
}

impl RawSample {
    pub fn new(interval_start: DateTime<Utc>, interval_end: DateTime<Utc>, value: i64) -> Self {
        Self {
            interval_start,
            interval_end,
            value,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn subject_id(&self) -> &str {
        self.label(SUBJECT_ID_LABEL)
    }

    pub fn subject_type(&self) -> &str {
        self.label(SUBJECT_TYPE_LABEL)
    }

    fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// All samples of one metric for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSeries {
    pub metric_type: String,
    pub subject_id: String,
    pub subject_type: String,
    pub samples: Vec<RawSample>,
}

impl RawSeries {
    /// Build a series, lifting the subject from the sample labels.
    ///
    /// Samples of one series are expected to share a subject; if they do not,
    /// the first non-empty value wins.
    pub fn new(metric_type: impl Into<String>, samples: Vec<RawSample>) -> Self {
        let subject_id = first_non_empty(&samples, RawSample::subject_id);
        let subject_type = first_non_empty(&samples, RawSample::subject_type);
        Self {
            metric_type: metric_type.into(),
            subject_id,
            subject_type,
            samples,
        }
    }

    /// Convert one backend time series. `metric_type` is the type that was
    /// queried for, not the one echoed back by the backend.
    pub fn from_time_series(
        metric_type: impl Into<String>,
        series: gcp_api::monitoring::TimeSeries,
    ) -> Self {
        let labels = series.metric.labels;
        let samples = series
            .points
            .into_iter()
            .map(|point| RawSample {
                interval_start: point.interval.start(),
                interval_end: point.interval.end_time,
                value: point.value.count(),
                labels: labels.clone(),
            })
            .collect();

        let mut raw = Self::new(metric_type, samples);
        // Series without points still carry their subject
        if raw.subject_id.is_empty() {
            raw.subject_id = labels.get(SUBJECT_ID_LABEL).cloned().unwrap_or_default();
        }
        if raw.subject_type.is_empty() {
            raw.subject_type = labels.get(SUBJECT_TYPE_LABEL).cloned().unwrap_or_default();
        }
        raw
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn first_non_empty(samples: &[RawSample], label: fn(&RawSample) -> &str) -> String {
    samples
        .iter()
        .map(label)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Number of events that happened within `[start, end)`.
///
/// `count` is negative when the backend reported a smaller running total
/// than before for the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCount {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedSeries {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject_type: String,
    pub metric_type: String,
    /// Oldest interval first
    pub intervals: Vec<IntervalCount>,
}

impl ExtractedSeries {
    pub fn total(&self) -> i64 {
        self.intervals.iter().map(|i| i.count).sum()
    }
}
