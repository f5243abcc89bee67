use async_trait::async_trait;
use chrono::Utc;
use common::SourceError;
use common::model::RawSeries;
use common::model::series::SUBJECT_ID_LABEL;
use common::source::{SeriesQuery, SeriesSource};
use futures::TryStreamExt;
use gcp_api::monitoring::{ListTimeSeriesParams, ListTimeSeriesResponse, TimeSeriesView};

use crate::client::{GcpClient, quote, since, timestamp};
use crate::pager::{Page, paginate};

/// Monitoring filter selecting one metric type and, optionally, one subject.
pub fn series_filter(metric_type: &str, subject: Option<&str>) -> String {
    let mut filter = format!("metric.type = {}", quote(metric_type));
    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        filter.push_str(&format!(
            " AND metric.labels.{SUBJECT_ID_LABEL} = {}",
            quote(subject)
        ));
    }
    filter
}

impl GcpClient {
    async fn time_series_page(
        &self,
        metric_type: &str,
        params: &ListTimeSeriesParams,
        page_token: Option<String>,
    ) -> Result<Page<RawSeries>, SourceError> {
        let params = ListTimeSeriesParams {
            page_token,
            ..params.clone()
        };
        let resp: ListTimeSeriesResponse =
            self.get(&self.monitoring_url("timeSeries"), &params).await?;

        log::trace!("Received a page of {} time series", resp.time_series.len());

        let items = resp
            .time_series
            .into_iter()
            .map(|ts| RawSeries::from_time_series(metric_type, ts))
            .collect();
        Ok(Page::new(items, resp.next_page_token))
    }
}

#[async_trait]
impl SeriesSource for GcpClient {
    async fn fetch(&self, query: &SeriesQuery) -> Result<Vec<RawSeries>, SourceError> {
        let now = Utc::now();
        let params = ListTimeSeriesParams {
            filter: series_filter(&query.metric_type, query.subject_filter.as_deref()),
            interval_start_time: timestamp(since(now, query.lookback)),
            interval_end_time: timestamp(now),
            view: TimeSeriesView::Full,
            page_size: None,
            page_token: None,
        };
        log::debug!(
            "Listing time series: filter={} start={} end={}",
            params.filter,
            params.interval_start_time,
            params.interval_end_time
        );

        let params = &params;
        let metric_type = query.metric_type.as_str();
        let series: Vec<RawSeries> =
            paginate(move |token| self.time_series_page(metric_type, params, token))
                .try_collect()
                .await?;

        log::debug!(
            "Fetched {} series for {}",
            series.len(),
            query.metric_type
        );
        Ok(series)
    }
}
