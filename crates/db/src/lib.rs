pub mod keys;
pub mod models;
pub mod store;

pub use keys::{is_valid_document_id, membership_key, normalize_invite_code};
pub use store::{
    DOCUMENT_ID_FIELD, Direction, Document, DocumentStore, FieldFilter, Fields, FilterOp,
    HttpDocumentStore, OrderBy, Query, StoreError, StoreResult,
};
