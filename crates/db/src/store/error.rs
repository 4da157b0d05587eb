use thiserror::Error;

/// Failure of a single document store round-trip, classified next to the
/// transport so callers never inspect raw HTTP status codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Document already exists: {0}")]
    AlreadyExists(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Timeouts, throttling and connection or 5xx failures may succeed on a
    /// later attempt. Everything else is permanent for the request as sent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::RateLimited(_) | StoreError::Unavailable(_)
        )
    }
}
