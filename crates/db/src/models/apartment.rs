use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apartment {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub invite_code: Option<String>,
}

impl Apartment {
    pub const COLLECTION: &'static str = "apartments";
}
