pub mod error;
pub mod http;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use http::HttpDocumentStore;

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// Pseudo-field that orders query results by document id.
pub const DOCUMENT_ID_FIELD: &str = "__id__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    /// Decodes the fields into a model, exposing the path id as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<T> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::Decode(format!("document {}: {e}", self.id)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    Equal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filtered, sorted and limited query over one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op: FilterOp::Equal,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value the query pins `field` to, if it filters on it.
    pub fn equality_on(&self, field: &str) -> Option<&Value> {
        self.filters
            .iter()
            .find(|f| f.field == field && f.op == FilterOp::Equal)
            .map(|f| &f.value)
    }
}

/// Remote document store addressed by collection and id.
///
/// Every call carries the caller's bearer token; access control is enforced
/// by the store, which answers with [`StoreError::PermissionDenied`] when the
/// caller may not read or write the addressed data.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, token: &str, collection: &str, id: &str) -> StoreResult<Document>;

    /// Conditional create: fails with [`StoreError::AlreadyExists`] when the
    /// id is taken.
    async fn create(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()>;

    /// Partial update touching only the keys present in `fields`.
    async fn patch(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()>;

    async fn query(
        &self,
        token: &str,
        collection: &str,
        query: &Query,
    ) -> StoreResult<Vec<Document>>;
}
