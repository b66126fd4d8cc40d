//! Batch orchestration: page 0, then the remaining pages in bounded chunks.

use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::envelope::PageEnvelope;
use super::error::{FetchError, PageFailure, SessionError};
use super::page_source::PageSource;
use super::progress::{progress_channel, ProgressSink, ProgressStream};
use super::session::FetchSession;
use crate::resources::Resource;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 5;

/// Something normalized pages can be merged into.
///
/// Pages are merged in ascending page order.
pub trait Aggregate<T> {
    fn extend_page(&mut self, items: Vec<T>);
}

impl<T> Aggregate<T> for Vec<T> {
    fn extend_page(&mut self, mut items: Vec<T>) {
        self.append(&mut items);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchSettings {
    /// Forwarded to the server as `size`.
    pub page_size: u32,
    /// Maximum number of page requests in flight at once.
    pub max_concurrent_requests: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// Summary of a finished fetch.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub total_pages: u32,
    pub total_elements: u64,
    /// Request rounds issued, page 0 included.
    pub batches: usize,
    pub pages_fetched: u32,
    pub failed_pages: Vec<PageFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }
}

#[derive(Debug)]
pub struct FetchOutcome<A> {
    pub data: A,
    pub report: FetchReport,
}

/// Splits pages `1..total_pages` into consecutive chunks of at most
/// `max_concurrent` pages. Chunks are produced on demand, `total_pages` comes
/// from the server.
pub fn plan_batches(total_pages: u32, max_concurrent: usize) -> impl Iterator<Item = Range<u32>> {
    let step = u32::try_from(max_concurrent.max(1)).unwrap_or(u32::MAX);
    (1..total_pages)
        .step_by(step as usize)
        .map(move |start| start..start.saturating_add(step).min(total_pages))
}

/// Retrieves every page of one paginated endpoint.
#[derive(Clone)]
pub struct PagedFetcher {
    source: Arc<dyn PageSource>,
    settings: FetchSettings,
}

impl PagedFetcher {
    pub fn new(source: Arc<dyn PageSource>, settings: FetchSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> FetchSettings {
        self.settings
    }

    /// Starts a session for `R`. The returned stream yields the session's
    /// progress events.
    pub fn start_session<R: Resource>(&self) -> (FetchSession<R>, ProgressStream) {
        let (sink, stream) = progress_channel();
        (
            FetchSession::new(self.clone(), sink, CancellationToken::new()),
            stream,
        )
    }

    /// Fetches all pages of `R` into a fresh aggregate.
    pub async fn fetch_all<R, A>(
        &self,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome<A>, SessionError>
    where
        R: Resource,
        A: Aggregate<R::Record> + Default,
    {
        let first = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            result = self.load_page::<R>(0) => result.map_err(SessionError::FirstPage)?,
        };

        let total_pages = first.total_pages;
        let mut data = A::default();
        let mut report = FetchReport {
            total_pages,
            total_elements: first.total_elements,
            batches: 1,
            pages_fetched: 1,
            failed_pages: Vec::new(),
        };

        if total_pages == 0 {
            debug!("{}: no pages", R::NAME);
            return Ok(FetchOutcome { data, report });
        }

        data.extend_page(first.content);
        progress.report(1, total_pages);

        let mut processed = 1;
        for chunk in plan_batches(total_pages, self.settings.max_concurrent_requests) {
            let requests = chunk.clone().map(|page| self.load_page::<R>(page));

            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SessionError::Cancelled),
                results = join_all(requests) => results,
            };
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            report.batches += 1;

            for (page, result) in chunk.clone().zip(results) {
                match result {
                    Ok(envelope) => {
                        data.extend_page(envelope.content);
                        report.pages_fetched += 1;
                    }
                    Err(error) => {
                        warn!("{}: page {} failed, skipping it: {}", R::NAME, page, error);
                        report.failed_pages.push(PageFailure { page, error });
                    }
                }
            }

            processed += chunk.end - chunk.start;
            progress.report(processed, total_pages);
        }

        info!(
            "{}: fetched {}/{} pages in {} batches",
            R::NAME,
            report.pages_fetched,
            total_pages,
            report.batches
        );
        Ok(FetchOutcome { data, report })
    }

    /// Fetches, unwraps and normalizes one page.
    async fn load_page<R: Resource>(&self, page: u32) -> Result<PageEnvelope<R::Record>, FetchError> {
        debug!("{}: fetching page {}", R::NAME, page);
        let raw = self
            .source
            .fetch_page(page, self.settings.page_size)
            .await?;
        let envelope = R::ENVELOPE.unwrap(raw)?;
        Ok(envelope.map_content(|items| decode_items::<R>(page, items)))
    }
}

/// Decodes and normalizes page items, skipping the ones that don't decode.
fn decode_items<R: Resource>(page: u32, items: Vec<Value>) -> Vec<R::Record> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<R::Raw>(item) {
            Ok(raw) => Some(R::normalize(raw)),
            Err(e) => {
                warn!("{}: skipping malformed item on page {}: {}", R::NAME, page, e);
                None
            }
        })
        .collect()
}
