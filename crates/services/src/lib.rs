pub mod auth;
pub mod dao;
pub mod error;
pub mod join;
pub mod resolver;
pub mod retry;

pub use auth::{AuthBackend, AuthRequired, Session, SessionProvider};
pub use dao::*;
pub use error::ProtocolError;
pub use join::{JoinCoordinator, JoinError};
pub use resolver::{ApartmentMetadata, MembershipResolver, Resolution, ResolutionSource};
pub use retry::{RetryPolicy, Retryable, with_retry};
