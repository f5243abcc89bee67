use async_trait::async_trait;
use chrono::Utc;
use common::SourceError;
use common::model::TraceRecord;
use common::source::{TraceQuery, TraceSource};
use futures::{StreamExt, TryStreamExt};
use gcp_api::trace::{ListTracesParams, ListTracesResponse, TraceView};

use crate::client::{GcpClient, since, timestamp};
use crate::pager::{Page, paginate};

const MAX_PAGE_SIZE: usize = 1000;

impl GcpClient {
    async fn traces_page(
        &self,
        params: &ListTracesParams,
        page_token: Option<String>,
    ) -> Result<Page<TraceRecord>, SourceError> {
        let params = ListTracesParams {
            page_token,
            ..params.clone()
        };
        let resp: ListTracesResponse = self.get(&self.trace_url("traces"), &params).await?;

        let items = resp.traces.into_iter().map(TraceRecord::from).collect();
        Ok(Page::new(items, resp.next_page_token))
    }
}

#[async_trait]
impl TraceSource for GcpClient {
    async fn recent(&self, query: &TraceQuery) -> Result<Vec<TraceRecord>, SourceError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let params = ListTracesParams {
            view: TraceView::Rootspan,
            page_size: Some(query.limit.min(MAX_PAGE_SIZE) as u32),
            page_token: None,
            start_time: query
                .lookback
                .map(|lookback| timestamp(since(Utc::now(), lookback))),
            end_time: None,
        };
        log::debug!("Listing traces: {params:?}");

        let params = &params;
        let traces: Vec<TraceRecord> = paginate(move |token| self.traces_page(params, token))
            .take(query.limit)
            .try_collect()
            .await?;

        log::debug!("Fetched {} traces", traces.len());
        Ok(traces)
    }
}
