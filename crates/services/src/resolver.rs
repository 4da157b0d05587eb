//! Works out which apartment a user currently belongs to.
//!
//! The profile pointer is only a hint. A candidate apartment is trusted once
//! a membership query scoped to it succeeds; the store refuses that query
//! for non-members, so a permission error marks the candidate as stale
//! rather than failing the resolution. A confirmed answer that the pointer
//! did not already hold is written back so the next run short-circuits.

use std::sync::Arc;

use homebase_db::{DocumentStore, is_valid_document_id};
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::dao::{ApartmentDao, DaoError, MembershipDao, UserDao};
use crate::error::ProtocolError;
use crate::retry::{RetryPolicy, with_retry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Confirmed from `users/{uid}.current_apartment_id`.
    ProfilePointer,
    /// Confirmed from the user's most recent membership row.
    MembershipHistory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApartmentMetadata {
    pub name: Option<String>,
    pub invite_code: Option<String>,
    /// Memberships of the apartment visible to the caller.
    pub member_count: usize,
    pub source: ResolutionSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        apartment_id: String,
        metadata: ApartmentMetadata,
    },
    NotFound,
}

impl Resolution {
    pub fn apartment_id(&self) -> Option<&str> {
        match self {
            Resolution::Found { apartment_id, .. } => Some(apartment_id),
            Resolution::NotFound => None,
        }
    }
}

pub struct MembershipResolver {
    users: UserDao,
    memberships: MembershipDao,
    apartments: ApartmentDao,
    policy: RetryPolicy,
}

impl MembershipResolver {
    pub fn new(store: Arc<dyn DocumentStore>, policy: RetryPolicy) -> Self {
        Self {
            users: UserDao::new(Arc::clone(&store)),
            memberships: MembershipDao::new(Arc::clone(&store)),
            apartments: ApartmentDao::new(store),
            policy,
        }
    }

    /// Resolves the current apartment of `session.uid`.
    ///
    /// Errors only when a store call keeps failing transiently past the retry
    /// budget, or the token itself is rejected.
    pub async fn resolve(&self, session: &Session) -> Result<Resolution, ProtocolError> {
        let pointer = self.profile_candidate(session).await?;
        let mut candidate = pointer
            .clone()
            .map(|id| (id, ResolutionSource::ProfilePointer));
        let mut history_checked = false;

        loop {
            let (apartment_id, source) = match candidate.take() {
                Some(found) => found,
                None if history_checked => return Ok(Resolution::NotFound),
                None => {
                    history_checked = true;
                    match self.history_candidate(session).await? {
                        // History is only consulted once the pointer failed.
                        Some(id) if pointer.as_deref() == Some(id.as_str()) => {
                            debug!(
                                uid = %session.uid,
                                apartment_id = %id,
                                "history repeats the stale pointer"
                            );
                            return Ok(Resolution::NotFound);
                        }
                        Some(id) => (id, ResolutionSource::MembershipHistory),
                        None => {
                            debug!(uid = %session.uid, "no membership history");
                            return Ok(Resolution::NotFound);
                        }
                    }
                }
            };

            let Some(member_count) = self.validate(session, &apartment_id).await? else {
                debug!(
                    uid = %session.uid,
                    %apartment_id,
                    ?source,
                    "candidate rejected by scoped membership query"
                );
                continue;
            };

            if pointer.as_deref() != Some(apartment_id.as_str()) {
                self.heal_pointer(session, &apartment_id).await;
            }

            let metadata = self.metadata(session, &apartment_id, member_count, source).await;
            info!(uid = %session.uid, %apartment_id, ?source, "apartment resolved");
            return Ok(Resolution::Found {
                apartment_id,
                metadata,
            });
        }
    }

    async fn profile_candidate(&self, session: &Session) -> Result<Option<String>, ProtocolError> {
        let profile = with_retry(&self.policy, "read profile", || {
            self.users.find_profile(&session.token, &session.uid)
        })
        .await;

        let pointer = match profile {
            Ok(Some(user)) => user.current_apartment_id,
            Ok(None) => None,
            // Rules on a freshly created profile can lag behind sign-up.
            Err(DaoError::Forbidden(msg)) => {
                debug!(uid = %session.uid, %msg, "profile not readable yet");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(pointer.filter(|id| {
            let valid = is_valid_document_id(id);
            if !valid {
                warn!(uid = %session.uid, pointer = %id, "ignoring malformed apartment pointer");
            }
            valid
        }))
    }

    async fn history_candidate(&self, session: &Session) -> Result<Option<String>, ProtocolError> {
        let latest = with_retry(&self.policy, "latest membership", || {
            self.memberships
                .latest_for_user(&session.token, &session.uid)
        })
        .await;

        match latest {
            Ok(latest) => Ok(latest
                .map(|m| m.apartment_id)
                .filter(|id| is_valid_document_id(id))),
            Err(DaoError::Forbidden(msg)) => {
                debug!(uid = %session.uid, %msg, "membership history not readable");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `Some(visible member count)` when the caller may read the apartment's
    /// memberships, `None` when the store refuses.
    async fn validate(
        &self,
        session: &Session,
        apartment_id: &str,
    ) -> Result<Option<usize>, ProtocolError> {
        let rows = with_retry(&self.policy, "validate membership", || {
            self.memberships
                .list_for_apartment(&session.token, apartment_id)
        })
        .await;

        match rows {
            Ok(rows) => Ok(Some(rows.len())),
            Err(DaoError::Forbidden(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn heal_pointer(&self, session: &Session, apartment_id: &str) {
        let healed = with_retry(&self.policy, "heal profile pointer", || {
            self.users
                .set_current_apartment(&session.token, &session.uid, apartment_id)
        })
        .await;

        match healed {
            Ok(()) => info!(uid = %session.uid, %apartment_id, "profile pointer healed"),
            Err(e) => warn!(
                uid = %session.uid,
                %apartment_id,
                error = %e,
                "could not heal profile pointer"
            ),
        }
    }

    async fn metadata(
        &self,
        session: &Session,
        apartment_id: &str,
        member_count: usize,
        source: ResolutionSource,
    ) -> ApartmentMetadata {
        let apartment = with_retry(&self.policy, "read apartment", || {
            self.apartments.find(&session.token, apartment_id)
        })
        .await
        .unwrap_or_else(|e| {
            debug!(%apartment_id, error = %e, "apartment details unavailable");
            None
        });

        ApartmentMetadata {
            name: apartment.as_ref().map(|a| a.name.clone()),
            invite_code: apartment.and_then(|a| a.invite_code),
            member_count,
            source,
        }
    }
}
