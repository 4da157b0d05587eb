use homebase_services::ApartmentMetadata;
use serde::Serialize;

/// Apartment the UI is currently showing, seeded from a confirmed resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApartmentContext {
    pub apartment_id: String,
    pub name: Option<String>,
    pub invite_code: Option<String>,
    pub member_count: usize,
}

impl ApartmentContext {
    pub fn new(apartment_id: String, metadata: ApartmentMetadata) -> Self {
        Self {
            apartment_id,
            name: metadata.name,
            invite_code: metadata.invite_code,
            member_count: metadata.member_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "apartment", rename_all = "snake_case")]
pub enum UiRoute {
    /// Initial state only; reconciliation always ends in one of the others.
    Loading,
    ApartmentHome(ApartmentContext),
    /// Join-or-create screen for users without a confirmed apartment.
    Selection,
    AuthRequired,
}

impl UiRoute {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UiRoute::Loading)
    }
}
