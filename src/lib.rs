//! Catalog Page Fetcher Library
//!
//! Paginated fetching, normalization and indexing for the music catalog API.

pub mod api;
pub mod comments;
pub mod config;
pub mod fetcher;
pub mod resources;

// Re-export commonly used types for convenience
pub use api::{CatalogClient, ClientConfig};
pub use comments::{CommentIndex, CommentRecord};
pub use fetcher::{
    FetchError, FetchOutcome, FetchReport, FetchSession, FetchSettings, PagedFetcher, Progress,
    ProgressStream, SessionError,
};
pub use resources::{Resource, VoteType, VotesState};
