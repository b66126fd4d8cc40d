use thiserror::Error;

/// Errors that can occur while requesting a single page (or any other call
/// against the catalog API).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("API error {code}: {message}")]
    ApiLogic { code: String, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// HTTP status code, if the error came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Errors that abort a whole fetch session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Page 0 failed, so the total page count is unknown.
    #[error("First page could not be fetched: {0}")]
    FirstPage(#[source] FetchError),

    #[error("Fetch session was cancelled")]
    Cancelled,
}

/// A non-first page that failed and was left out of the aggregate.
#[derive(Debug)]
pub struct PageFailure {
    pub page: u32,
    pub error: FetchError,
}
