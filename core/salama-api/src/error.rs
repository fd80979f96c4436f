//! Error types for the license API client.

use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when calling the license API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connection refused, DNS, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status without a readable business message.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server answered, but refused the operation. The message is the
    /// server's own wording and is shown to the user verbatim.
    #[error("{message}")]
    Rejected { message: String },

    /// The response parsed as JSON but did not have the expected shape.
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns true if retrying the same request may succeed; transport
    /// failures and 5xx responses qualify, business rejections do not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            ApiError::Rejected { .. } | ApiError::InvalidResponse(_) => false,
        }
    }
}
