use serde::{Deserialize, Serialize};

/// Profile document at `users/{uid}`.
///
/// Only `current_apartment_id` is written by the membership protocol, and only
/// through a partial update, so the remaining fields are never clobbered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct User {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub current_apartment_id: Option<String>,
}

impl User {
    pub const COLLECTION: &'static str = "users";
    pub const CURRENT_APARTMENT_FIELD: &'static str = "current_apartment_id";
}
