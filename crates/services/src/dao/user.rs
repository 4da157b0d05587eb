use std::sync::Arc;

use homebase_db::models::User;
use homebase_db::{DocumentStore, Fields};
use serde_json::Value;

use super::base::{BaseDao, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseDao::new(store, User::COLLECTION),
        }
    }

    pub async fn find_profile(&self, token: &str, uid: &str) -> DaoResult<Option<User>> {
        self.base.find_optional(token, uid).await
    }

    /// Partial update of the apartment pointer; other profile fields stay as
    /// they are on the server.
    pub async fn set_current_apartment(
        &self,
        token: &str,
        uid: &str,
        apartment_id: &str,
    ) -> DaoResult<()> {
        let mut fields = Fields::new();
        fields.insert(
            User::CURRENT_APARTMENT_FIELD.to_string(),
            Value::String(apartment_id.to_string()),
        );
        self.base.update_fields(token, uid, fields).await
    }
}
