//! Cloud Monitoring API v3 (`projects.timeSeries.list`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /v3/projects/{project}/timeSeries`.
#[derive(Debug, Clone, Serialize)]
pub struct ListTimeSeriesParams {
    pub filter: String,
    #[serde(rename = "interval.startTime")]
    pub interval_start_time: String,
    #[serde(rename = "interval.endTime")]
    pub interval_end_time: String,
    pub view: TimeSeriesView,
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(rename = "pageToken", skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeSeriesView {
    #[default]
    Full,
    Headers,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTimeSeriesResponse {
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub resource: MonitoredResource,
    #[serde(default)]
    pub metric_kind: String,
    #[serde(default)]
    pub value_type: String,
    /// Points are returned newest first.
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type", default)]
    pub metric_type: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub interval: TimeInterval,
    #[serde(default)]
    pub value: TypedValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub end_time: DateTime<Utc>,
    /// Absent for gauge metrics, where the interval is a single instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
}

impl TimeInterval {
    pub fn start(&self) -> DateTime<Utc> {
        self.start_time.unwrap_or(self.end_time)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bool_value: Option<bool>,
    #[serde(
        default,
        with = "crate::int64::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub int64_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_value: Option<Distribution>,
}

impl TypedValue {
    /// Event count carried by this value: the distribution's population
    /// count, or the raw integer for `INT64` metrics. Anything else counts as zero.
    pub fn count(&self) -> i64 {
        if let Some(distribution) = &self.distribution_value {
            return distribution.count;
        }
        self.int64_value.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(default, with = "crate::int64")]
    pub count: i64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub sum_of_squared_deviation: f64,
    #[serde(default, with = "crate::int64::vec")]
    pub bucket_counts: Vec<i64>,
}
