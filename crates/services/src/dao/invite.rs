use std::sync::Arc;

use homebase_db::models::InviteCode;
use homebase_db::{DocumentStore, is_valid_document_id, normalize_invite_code};

use super::base::{BaseDao, DaoResult};

/// Read-only view of the invite registry.
pub struct InviteDao {
    pub base: BaseDao<InviteCode>,
}

impl InviteDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseDao::new(store, InviteCode::COLLECTION),
        }
    }

    /// Looks the code up by its normalized form. Codes that cannot name a
    /// registry entry resolve to `None` without a round-trip.
    pub async fn find_by_code(
        &self,
        token: &str,
        raw_code: &str,
    ) -> DaoResult<Option<InviteCode>> {
        let code = normalize_invite_code(raw_code);
        if !is_valid_document_id(&code) {
            return Ok(None);
        }
        self.base.find_optional(token, &code).await
    }
}
