use homebase_db::StoreError;
use thiserror::Error;

use crate::auth::AuthRequired;
use crate::dao::DaoError;

/// Terminal outcomes of the join and resolution flows that callers act on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Authentication required")]
    AuthRequired,
    #[error("Invite code not found: {0}")]
    InviteNotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Network failure: {0}")]
    NetworkTransient(String),
    #[error("Store error: {0}")]
    Store(String),
}

impl From<AuthRequired> for ProtocolError {
    fn from(_: AuthRequired) -> Self {
        ProtocolError::AuthRequired
    }
}

impl From<DaoError> for ProtocolError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::Forbidden(msg) => ProtocolError::PermissionDenied(msg),
            DaoError::Store(StoreError::Unauthenticated(_)) => ProtocolError::AuthRequired,
            DaoError::Store(e) if e.is_retryable() => {
                ProtocolError::NetworkTransient(e.to_string())
            }
            other => ProtocolError::Store(other.to_string()),
        }
    }
}
