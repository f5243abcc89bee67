//! Lazy iteration over `nextPageToken`-paged list APIs.

use std::future::Future;

use async_stream::try_stream;
use common::SourceError;
use futures::Stream;

/// One page of a list response.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Empty on the last page
    pub next_page_token: String,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page_token: String) -> Self {
        Self {
            items,
            next_page_token,
        }
    }
}

/// Stream every item of every page. `fetch` is called with the page token
/// (`None` for the first page) only once the previous page has been drained,
/// so dropping the stream early stops further requests. The first error is
/// yielded and ends the stream.
pub fn paginate<T, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<T, SourceError>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    try_stream! {
        let mut token: Option<String> = None;
        loop {
            let requested = token.clone();
            let page = fetch(token.take()).await?;
            for item in page.items {
                yield item;
            }

            if page.next_page_token.is_empty() {
                break;
            }
            if requested.as_deref() == Some(page.next_page_token.as_str()) {
                log::warn!("Backend returned the same page token twice, stopping");
                break;
            }
            token = Some(page.next_page_token);
        }
    }
}
