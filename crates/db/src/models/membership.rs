use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::membership_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub apartment_id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: MembershipRole,
    /// Stored as epoch milliseconds so the store orders it numerically.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    #[default]
    Member,
    Owner,
}

impl Membership {
    pub const COLLECTION: &'static str = "memberships";

    pub fn new(apartment_id: &str, user_id: &str, role: MembershipRole) -> Self {
        Self {
            id: membership_key(apartment_id, user_id),
            apartment_id: apartment_id.to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now(),
        }
    }
}
