pub mod credentials;
pub mod token_client;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredential,
};
pub use token_client::TokenAuthClient;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No signed-in user")]
    NoSession,
    #[error("Token refresh rejected: {0}")]
    TokenRefresh(String),
    #[error("Credential storage error: {0}")]
    Credentials(String),
    #[error("Auth transport error: {0}")]
    Transport(String),
}

/// The one failure a session request can surface: the user has to
/// authenticate again.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Authentication required")]
pub struct AuthRequired;

/// Token freshly issued by the auth backend for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub uid: String,
    pub token: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens are short-lived; anything claiming longer is clamped.
const MAX_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

impl Session {
    pub fn from_issued(issued: IssuedToken) -> Self {
        let ttl = issued.expires_in.min(MAX_TOKEN_TTL_SECS) as i64;
        Self {
            uid: issued.uid,
            token: issued.token,
            expires_at: Utc::now() + Duration::seconds(ttl),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Authentication collaborator: issues short-lived bearer tokens bound to a
/// user and can bring back the most recent session of a returning user.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Identity currently held in memory, if any.
    fn current_uid(&self) -> Option<String>;

    /// Mints a new token for the in-memory identity, bypassing any cache.
    async fn mint_token(&self) -> Result<IssuedToken, AuthError>;

    /// Re-establishes the in-memory identity from persisted credential
    /// material. `Ok(None)` when nothing is persisted.
    async fn restore_session(&self) -> Result<Option<IssuedToken>, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

pub struct SessionProvider {
    backend: Arc<dyn AuthBackend>,
}

impl SessionProvider {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    /// Returns the signed-in user with a token minted for this call.
    ///
    /// A cached identity gets a fresh token; otherwise the persisted session
    /// is restored. Every failure along the way becomes [`AuthRequired`].
    pub async fn require_session(&self) -> Result<Session, AuthRequired> {
        let issued = match self.backend.current_uid() {
            Some(uid) => {
                let issued = self.backend.mint_token().await.map_err(|e| {
                    warn!(%uid, error = %e, "token refresh failed");
                    AuthRequired
                })?;
                if issued.uid != uid {
                    warn!(%uid, issued_for = %issued.uid, "token minted for another user");
                    return Err(AuthRequired);
                }
                issued
            }
            None => match self.backend.restore_session().await {
                Ok(Some(issued)) => {
                    debug!(uid = %issued.uid, "restored persisted session");
                    issued
                }
                Ok(None) => return Err(AuthRequired),
                Err(e) => {
                    warn!(error = %e, "session restore failed");
                    return Err(AuthRequired);
                }
            },
        };
        Ok(Session::from_issued(issued))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let issued = self.backend.sign_in(email, password).await?;
        Ok(Session::from_issued(issued))
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out().await
    }
}
