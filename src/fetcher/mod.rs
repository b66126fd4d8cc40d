//! Paginated fetch engine.
//!
//! Fetches page 0 to learn the page count, then the remaining pages in
//! sequential chunks of at most `max_concurrent_requests` concurrent
//! requests. Output order is always ascending page order. A failing page 0
//! aborts the session; any other failing page is logged and left out.

mod envelope;
mod error;
mod orchestrator;
mod page_source;
mod progress;
mod session;

pub use envelope::{EnvelopeShape, PageEnvelope};
pub use error::{FetchError, PageFailure, SessionError};
pub use orchestrator::{
    plan_batches, Aggregate, FetchOutcome, FetchReport, FetchSettings, PagedFetcher,
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_PAGE_SIZE,
};
pub use page_source::{EndpointConfig, HttpPageSource, PageSource};
pub use progress::{Progress, ProgressSink, ProgressStream};
pub use session::FetchSession;

pub(crate) use page_source::{build_headers, read_json};
