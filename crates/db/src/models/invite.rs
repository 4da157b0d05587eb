use serde::{Deserialize, Serialize};

/// Registry entry keyed by the normalized code string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub apartment_id: String,
    #[serde(default)]
    pub apartment_name: Option<String>,
}

impl InviteCode {
    pub const COLLECTION: &'static str = "invite_codes";
}
