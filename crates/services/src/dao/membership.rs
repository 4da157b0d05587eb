use std::sync::Arc;

use homebase_db::models::{Membership, MembershipRole};
use homebase_db::{DOCUMENT_ID_FIELD, Direction, DocumentStore, Query};

use super::base::{BaseDao, DaoError, DaoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipWrite {
    Created,
    AlreadyExisted,
}

pub struct MembershipDao {
    pub base: BaseDao<Membership>,
}

impl MembershipDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseDao::new(store, Membership::COLLECTION),
        }
    }

    /// Creates the membership under its composite key. A conflict means an
    /// earlier attempt already wrote the row, which is the state we want.
    pub async fn create_idempotent(
        &self,
        token: &str,
        apartment_id: &str,
        user_id: &str,
        role: MembershipRole,
    ) -> DaoResult<MembershipWrite> {
        let membership = Membership::new(apartment_id, user_id, role);
        match self
            .base
            .insert_with_id(token, &membership.id, &membership)
            .await
        {
            Ok(()) => Ok(MembershipWrite::Created),
            Err(DaoError::DuplicateKey(_)) => Ok(MembershipWrite::AlreadyExisted),
            Err(e) => Err(e),
        }
    }

    /// Most recent membership of the user. Equal `joined_at` values are
    /// broken by document id so the answer is stable across reads.
    pub async fn latest_for_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> DaoResult<Option<Membership>> {
        let query = Query::new()
            .where_eq("user_id", user_id)
            .order_by("joined_at", Direction::Descending)
            .order_by(DOCUMENT_ID_FIELD, Direction::Descending)
            .limit(1);
        let mut rows = self.base.find_many(token, &query).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    /// Memberships of one apartment. The store refuses this query with a
    /// permission error unless the caller is a member of that apartment.
    pub async fn list_for_apartment(
        &self,
        token: &str,
        apartment_id: &str,
    ) -> DaoResult<Vec<Membership>> {
        let query = Query::new().where_eq("apartment_id", apartment_id);
        self.base.find_many(token, &query).await
    }
}
