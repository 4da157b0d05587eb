use std::sync::Arc;

use homebase_db::DocumentStore;
use homebase_db::models::Apartment;

use super::base::{BaseDao, DaoResult};

pub struct ApartmentDao {
    pub base: BaseDao<Apartment>,
}

impl ApartmentDao {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            base: BaseDao::new(store, Apartment::COLLECTION),
        }
    }

    pub async fn find(&self, token: &str, apartment_id: &str) -> DaoResult<Option<Apartment>> {
        self.base.find_optional(token, apartment_id).await
    }
}
