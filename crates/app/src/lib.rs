pub mod apartment_state;
pub mod error;
pub mod reconcile;
pub mod route;
pub mod state;
pub mod telemetry;

pub use apartment_state::ApartmentState;
pub use error::UiNotice;
pub use reconcile::PostAuthReconciler;
pub use route::{ApartmentContext, UiRoute};
pub use state::AppState;
