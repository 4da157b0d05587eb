//! Entry-point routing after authentication.
//!
//! Resolution runs once, under a short deadline and a small retry budget. A
//! user without a confirmed apartment is a normal outcome, so every failure
//! short of an auth problem lands on the selection screen instead of leaving
//! the caller on a spinner.

use std::sync::Arc;
use std::time::Duration;

use homebase_services::{
    ApartmentMetadata, JoinCoordinator, JoinError, MembershipResolver, ProtocolError, Resolution,
    ResolutionSource, SessionProvider,
};
use tracing::{info, warn};

use crate::apartment_state::ApartmentState;
use crate::error::UiNotice;
use crate::route::{ApartmentContext, UiRoute};

pub struct PostAuthReconciler {
    sessions: Arc<SessionProvider>,
    resolver: Arc<MembershipResolver>,
    join: Arc<JoinCoordinator>,
    apartment: ApartmentState,
    timeout: Duration,
}

impl PostAuthReconciler {
    pub fn new(
        sessions: Arc<SessionProvider>,
        resolver: Arc<MembershipResolver>,
        join: Arc<JoinCoordinator>,
        apartment: ApartmentState,
        timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            resolver,
            join,
            apartment,
            timeout,
        }
    }

    /// Decides where a freshly authenticated user lands. Never returns
    /// [`UiRoute::Loading`].
    pub async fn reconcile(&self) -> UiRoute {
        let attempt = async {
            let session = self.sessions.require_session().await?;
            let resolution = self.resolver.resolve(&session).await?;
            Ok::<_, ProtocolError>(resolution)
        };

        let route = match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(Resolution::Found {
                apartment_id,
                metadata,
            })) => {
                let context = ApartmentContext::new(apartment_id, metadata);
                self.apartment.seed(context.clone());
                UiRoute::ApartmentHome(context)
            }
            Ok(Ok(Resolution::NotFound)) => UiRoute::Selection,
            Ok(Err(ProtocolError::AuthRequired)) => UiRoute::AuthRequired,
            Ok(Err(e)) => {
                warn!(error = %e, "resolution failed, falling back to selection");
                UiRoute::Selection
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "resolution timed out, falling back to selection"
                );
                UiRoute::Selection
            }
        };

        if !matches!(route, UiRoute::ApartmentHome(_)) {
            self.apartment.clear();
        }
        info!(?route, "post-auth route decided");
        route
    }

    /// Password sign-in followed by reconciliation.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UiRoute, UiNotice> {
        self.sessions.sign_in(email, password).await?;
        Ok(self.reconcile().await)
    }

    /// Redeems an invite, then re-runs resolution to confirm where the user
    /// ended up.
    pub async fn redeem_invite(&self, raw_code: &str) -> Result<UiRoute, UiNotice> {
        let session = match self.sessions.require_session().await {
            Ok(session) => session,
            Err(_) => return Ok(UiRoute::AuthRequired),
        };

        let joined = match self.join.redeem(&session.uid, raw_code).await {
            Ok(apartment_id) => apartment_id,
            Err(JoinError {
                error: ProtocolError::InviteNotFound(code),
                ..
            }) => {
                info!(uid = %session.uid, %code, "invite code not found");
                return Err(UiNotice::InviteNotFound);
            }
            Err(JoinError {
                error: ProtocolError::AuthRequired,
                ..
            }) => return Ok(UiRoute::AuthRequired),
            Err(JoinError {
                apartment_id: Some(target),
                error,
            }) => {
                // The membership may have landed before the failure.
                warn!(uid = %session.uid, %target, %error, "join failed, checking for membership");
                return match self.reconcile().await {
                    UiRoute::ApartmentHome(context) if context.apartment_id == target => {
                        Ok(UiRoute::ApartmentHome(context))
                    }
                    UiRoute::AuthRequired => Ok(UiRoute::AuthRequired),
                    _ => Err(error.into()),
                };
            }
            Err(JoinError { error, .. }) => {
                warn!(uid = %session.uid, %error, "join failed before the invite resolved");
                return Err(error.into());
            }
        };

        match self.reconcile().await {
            UiRoute::ApartmentHome(context) => {
                if context.apartment_id != joined {
                    warn!(
                        uid = %session.uid,
                        %joined,
                        confirmed = %context.apartment_id,
                        "resolution confirmed a different apartment than the one joined"
                    );
                }
                Ok(UiRoute::ApartmentHome(context))
            }
            UiRoute::AuthRequired => Ok(UiRoute::AuthRequired),
            _ => {
                // Both writes succeeded; only the confirmation read is missing.
                warn!(uid = %session.uid, apartment_id = %joined, "join not yet confirmed");
                let context = ApartmentContext::new(
                    joined,
                    ApartmentMetadata {
                        name: None,
                        invite_code: None,
                        member_count: 1,
                        source: ResolutionSource::MembershipHistory,
                    },
                );
                self.apartment.seed(context.clone());
                Ok(UiRoute::ApartmentHome(context))
            }
        }
    }

    pub async fn sign_out(&self) -> UiRoute {
        if let Err(e) = self.sessions.sign_out().await {
            warn!(error = %e, "sign-out did not clear persisted credentials");
        }
        self.apartment.clear();
        UiRoute::AuthRequired
    }
}
