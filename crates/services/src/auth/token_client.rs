//! HTTP client for the token service: password sign-in and refresh-token
//! exchange, with the refresh credential persisted between runs.

use std::sync::Arc;

use async_trait::async_trait;
use homebase_config::AuthSettings;
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AuthBackend, AuthError, CredentialStore, IssuedToken, StoredCredential};

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    uid: String,
    id_token: String,
    refresh_token: String,
    expires_in: u64,
}

pub struct TokenAuthClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    credentials: Arc<dyn CredentialStore>,
    current: RwLock<Option<StoredCredential>>,
    /// Held across read, exchange and `remember`. The token service accepts
    /// each refresh token once, so concurrent exchanges must not share one.
    refresh_lock: Mutex<()>,
}

impl TokenAuthClient {
    pub fn new(settings: &AuthSettings, credentials: Arc<dyn CredentialStore>) -> Self {
        Self::with_client(Client::new(), settings, credentials)
    }

    pub fn with_client(
        client: Client,
        settings: &AuthSettings,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            credentials,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    async fn post_for_token<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Result<TokenResponse, StatusCode>, AuthError> {
        let mut request = self
            .client
            .post(format!("{}/v1/{path}", self.base_url))
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, path, "token service refused request");
            return Ok(Err(status));
        }
        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(Ok(token))
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        let body = RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
        };
        match self.post_for_token("token", &body).await? {
            Ok(token) => Ok(token),
            Err(status) if status.is_client_error() => {
                Err(AuthError::TokenRefresh(format!("status {}", status.as_u16())))
            }
            Err(status) => Err(AuthError::Transport(format!("status {}", status.as_u16()))),
        }
    }

    /// Keeps the in-memory identity and the persisted copy in step with the
    /// latest (possibly rotated) refresh token.
    fn remember(&self, token: &TokenResponse) -> Result<(), AuthError> {
        let credential = StoredCredential {
            uid: token.uid.clone(),
            refresh_token: token.refresh_token.clone(),
        };
        self.credentials.save(&credential)?;
        *self.current.write() = Some(credential);
        Ok(())
    }
}

impl From<TokenResponse> for IssuedToken {
    fn from(token: TokenResponse) -> Self {
        Self {
            uid: token.uid,
            token: token.id_token,
            expires_in: token.expires_in,
        }
    }
}

#[async_trait]
impl AuthBackend for TokenAuthClient {
    fn current_uid(&self) -> Option<String> {
        self.current.read().as_ref().map(|c| c.uid.clone())
    }

    async fn mint_token(&self) -> Result<IssuedToken, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        // Re-read under the lock: the previous holder may have rotated it.
        let current = self.current.read().clone().ok_or(AuthError::NoSession)?;
        let token = self.exchange_refresh_token(&current.refresh_token).await?;
        if token.uid != current.uid {
            return Err(AuthError::TokenRefresh(format!(
                "token issued for {} instead of {}",
                token.uid, current.uid
            )));
        }
        self.remember(&token)?;
        Ok(token.into())
    }

    async fn restore_session(&self) -> Result<Option<IssuedToken>, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        // A concurrent caller may have restored and rotated while we waited.
        let cached = self.current.read().clone();
        let stored = match cached {
            Some(current) => Some(current),
            None => self.credentials.load()?,
        };
        let Some(stored) = stored else {
            return Ok(None);
        };
        let token = self.exchange_refresh_token(&stored.refresh_token).await?;
        self.remember(&token)?;
        info!(uid = %token.uid, "session restored");
        Ok(Some(token.into()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        let body = SignInRequest { email, password };
        let token = match self.post_for_token("accounts:signIn", &body).await? {
            Ok(token) => token,
            Err(status) if status.is_client_error() => return Err(AuthError::InvalidCredentials),
            Err(status) => {
                return Err(AuthError::Transport(format!("status {}", status.as_u16())));
            }
        };
        self.remember(&token)?;
        info!(uid = %token.uid, "signed in");
        Ok(token.into())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        *self.current.write() = None;
        self.credentials.clear()
    }
}
