//! Invite redemption.
//!
//! Three idempotent steps, each retried on its own: registry lookup,
//! conditional membership create under the composite key, and a partial
//! update of the profile pointer. Nothing ties the last two together; if the
//! pointer update is lost the resolver finds the membership and repairs it.

use std::sync::Arc;

use homebase_db::models::MembershipRole;
use homebase_db::{DocumentStore, is_valid_document_id, normalize_invite_code};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::SessionProvider;
use crate::dao::{DaoError, InviteDao, MembershipDao, UserDao};
use crate::error::ProtocolError;
use crate::retry::{RetryPolicy, with_retry};

/// A failed join, plus the apartment the invite pointed at when the lookup
/// got that far.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct JoinError {
    pub apartment_id: Option<String>,
    pub error: ProtocolError,
}

impl From<ProtocolError> for JoinError {
    fn from(error: ProtocolError) -> Self {
        Self {
            apartment_id: None,
            error,
        }
    }
}

pub struct JoinCoordinator {
    sessions: Arc<SessionProvider>,
    invites: InviteDao,
    memberships: MembershipDao,
    users: UserDao,
    policy: RetryPolicy,
}

impl JoinCoordinator {
    pub fn new(
        sessions: Arc<SessionProvider>,
        store: Arc<dyn DocumentStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            sessions,
            invites: InviteDao::new(Arc::clone(&store)),
            memberships: MembershipDao::new(Arc::clone(&store)),
            users: UserDao::new(store),
            policy,
        }
    }

    /// Joins `uid` to the apartment behind `raw_code` and returns its id.
    ///
    /// Safe to repeat: a second call with the same code finds the existing
    /// membership and succeeds.
    pub async fn join(&self, uid: &str, raw_code: &str) -> Result<String, ProtocolError> {
        self.redeem(uid, raw_code).await.map_err(|e| e.error)
    }

    /// Same as [`join`](Self::join), keeping the invite's apartment id on
    /// failures after the lookup.
    pub async fn redeem(&self, uid: &str, raw_code: &str) -> Result<String, JoinError> {
        let code = normalize_invite_code(raw_code);
        if !is_valid_document_id(&code) {
            return Err(ProtocolError::InviteNotFound(code).into());
        }

        // Minted here so the writes below carry current claims.
        let session = self
            .sessions
            .require_session()
            .await
            .map_err(ProtocolError::from)?;
        if session.uid != uid {
            warn!(%uid, session_uid = %session.uid, "join requested for another user");
            return Err(ProtocolError::AuthRequired.into());
        }
        let token = session.token.as_str();

        let invite = with_retry(&self.policy, "invite lookup", || {
            self.invites.find_by_code(token, &code)
        })
        .await
        .map_err(ProtocolError::from)?
        .ok_or_else(|| ProtocolError::InviteNotFound(code.clone()))?;
        let apartment_id = invite.apartment_id;
        if !is_valid_document_id(&apartment_id) {
            return Err(ProtocolError::Store(format!(
                "invite {code} points at malformed apartment id {apartment_id:?}"
            ))
            .into());
        }
        debug!(%uid, %code, %apartment_id, "invite resolved");

        let failed = |e: DaoError| JoinError {
            apartment_id: Some(apartment_id.clone()),
            error: ProtocolError::from(e),
        };

        let write = with_retry(&self.policy, "create membership", || {
            self.memberships
                .create_idempotent(token, &apartment_id, uid, MembershipRole::Member)
        })
        .await
        .map_err(failed)?;
        info!(%uid, %apartment_id, ?write, "membership ensured");

        with_retry(&self.policy, "update profile pointer", || {
            self.users.set_current_apartment(token, uid, &apartment_id)
        })
        .await
        .map_err(failed)?;
        info!(%uid, %apartment_id, "joined apartment");

        Ok(apartment_id)
    }
}
