use homebase_services::ProtocolError;
use homebase_services::auth::AuthError;
use thiserror::Error;

/// User-facing failure shown next to a route. Transport details never get
/// this far; they collapse into [`UiNotice::TryAgain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UiNotice {
    #[error("That invite code doesn't match any apartment.")]
    InviteNotFound,
    #[error("Email or password is incorrect.")]
    InvalidCredentials,
    #[error("Please sign in again.")]
    SignInAgain,
    #[error("Couldn't reach the server. Please try again.")]
    TryAgain,
}

impl From<ProtocolError> for UiNotice {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InviteNotFound(_) => UiNotice::InviteNotFound,
            ProtocolError::AuthRequired => UiNotice::SignInAgain,
            ProtocolError::PermissionDenied(_)
            | ProtocolError::NetworkTransient(_)
            | ProtocolError::Store(_) => UiNotice::TryAgain,
        }
    }
}

impl From<AuthError> for UiNotice {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => UiNotice::InvalidCredentials,
            AuthError::NoSession | AuthError::TokenRefresh(_) => UiNotice::SignInAgain,
            AuthError::Credentials(_) | AuthError::Transport(_) => UiNotice::TryAgain,
        }
    }
}
