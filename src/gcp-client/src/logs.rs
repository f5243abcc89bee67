use async_trait::async_trait;
use chrono::Utc;
use common::SourceError;
use common::model::LogRecord;
use common::source::{LogQuery, LogSource};
use futures::{StreamExt, TryStreamExt};
use gcp_api::logging::{ListLogEntriesRequest, ListLogEntriesResponse, NEWEST_FIRST};

use crate::client::{GcpClient, quote, since, timestamp};
use crate::pager::{Page, paginate};

/// Largest page `entries.list` accepts
const MAX_PAGE_SIZE: usize = 1000;

/// Full resource name of a log. Names that are already qualified are kept,
/// short names are URL-encoded the way Cloud Logging stores them.
pub fn qualified_log_name(project_id: &str, log_name: &str) -> String {
    if log_name.starts_with("projects/") {
        log_name.to_string()
    } else {
        format!(
            "projects/{project_id}/logs/{}",
            log_name.replace('/', "%2F")
        )
    }
}

impl GcpClient {
    async fn log_entries_page(
        &self,
        request: &ListLogEntriesRequest,
        page_token: Option<String>,
    ) -> Result<Page<LogRecord>, SourceError> {
        let request = ListLogEntriesRequest {
            page_token,
            ..request.clone()
        };
        let resp: ListLogEntriesResponse =
            self.post(&self.logging_url("entries:list"), &request).await?;

        let items = resp.entries.into_iter().map(LogRecord::from).collect();
        Ok(Page::new(items, resp.next_page_token))
    }
}

#[async_trait]
impl LogSource for GcpClient {
    async fn recent(&self, query: &LogQuery) -> Result<Vec<LogRecord>, SourceError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let log_name = qualified_log_name(self.project_id(), &query.log_name);
        let start = timestamp(since(Utc::now(), query.lookback));
        let request = ListLogEntriesRequest {
            resource_names: vec![self.project_resource()],
            filter: format!("logName = {} AND timestamp > {}", quote(&log_name), quote(&start)),
            order_by: NEWEST_FIRST.to_string(),
            page_size: Some(query.limit.min(MAX_PAGE_SIZE) as u32),
            page_token: None,
        };
        log::debug!("Listing log entries: filter={}", request.filter);

        let request = &request;
        let entries: Vec<LogRecord> = paginate(move |token| self.log_entries_page(request, token))
            .take(query.limit)
            .try_collect()
            .await?;

        log::debug!("Fetched {} entries from {log_name}", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_log_name() {
        assert_eq!(
            qualified_log_name("demo", "app"),
            "projects/demo/logs/app"
        );
        assert_eq!(
            qualified_log_name("demo", "cloudaudit.googleapis.com/activity"),
            "projects/demo/logs/cloudaudit.googleapis.com%2Factivity"
        );
        assert_eq!(
            qualified_log_name("demo", "projects/other/logs/app"),
            "projects/other/logs/app"
        );
    }
}
