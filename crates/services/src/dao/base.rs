use std::marker::PhantomData;
use std::sync::Arc;

use homebase_db::{DocumentStore, Fields, Query, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Store error: {0}")]
    Store(StoreError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation: {0}")]
    Validation(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

impl From<StoreError> for DaoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => DaoError::NotFound,
            StoreError::AlreadyExists(msg) => DaoError::DuplicateKey(msg),
            StoreError::PermissionDenied(msg) => DaoError::Forbidden(msg),
            StoreError::InvalidRequest(msg) => DaoError::Validation(msg),
            other => DaoError::Store(other),
        }
    }
}

impl DaoError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, DaoError::Store(e) if e.is_retryable())
    }
}

pub struct BaseDao<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for BaseDao<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _model: PhantomData,
        }
    }
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _model: PhantomData,
        }
    }

    pub async fn find_by_id(&self, token: &str, id: &str) -> DaoResult<T> {
        let doc = self.store.get(token, self.collection, id).await?;
        Ok(doc.decode()?)
    }

    pub async fn find_optional(&self, token: &str, id: &str) -> DaoResult<Option<T>> {
        match self.find_by_id(token, id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn find_many(&self, token: &str, query: &Query) -> DaoResult<Vec<T>> {
        let docs = self.store.query(token, self.collection, query).await?;
        let mut results = Vec::with_capacity(docs.len());
        for doc in docs {
            results.push(doc.decode()?);
        }
        Ok(results)
    }

    pub async fn insert_with_id(&self, token: &str, id: &str, model: &T) -> DaoResult<()> {
        let fields = match serde_json::to_value(model)? {
            Value::Object(fields) => fields,
            other => {
                return Err(DaoError::Validation(format!(
                    "{} documents must serialize to an object, got {other}",
                    self.collection
                )));
            }
        };
        self.store
            .create(token, self.collection, id, fields)
            .await?;
        debug!(collection = self.collection, id, "Inserted document");
        Ok(())
    }

    pub async fn update_fields(&self, token: &str, id: &str, fields: Fields) -> DaoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        self.store
            .patch(token, self.collection, id, fields)
            .await?;
        Ok(())
    }
}
