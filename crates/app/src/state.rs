use std::sync::Arc;

use homebase_config::Settings;
use homebase_db::{DocumentStore, HttpDocumentStore};
use homebase_services::auth::{
    AuthBackend, CredentialStore, FileCredentialStore, TokenAuthClient,
};
use homebase_services::{JoinCoordinator, MembershipResolver, RetryPolicy, SessionProvider};

use crate::apartment_state::ApartmentState;
use crate::reconcile::PostAuthReconciler;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionProvider>,
    pub join: Arc<JoinCoordinator>,
    pub reconciler: Arc<PostAuthReconciler>,
    pub apartment: ApartmentState,
}

impl AppState {
    /// Wires the HTTP store and token service from settings.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = Arc::new(HttpDocumentStore::new(&settings.store)?);

        let credentials: Arc<dyn CredentialStore> = match &settings.auth.credentials_path {
            Some(path) => Arc::new(FileCredentialStore::new(path)),
            None => Arc::new(FileCredentialStore::in_default_location()?),
        };
        let auth: Arc<dyn AuthBackend> =
            Arc::new(TokenAuthClient::new(&settings.auth, credentials));

        Ok(Self::from_parts(settings, store, auth))
    }

    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthBackend>,
    ) -> Self {
        let policy = RetryPolicy::from(&settings.retry);
        // Routing gets a smaller budget than writes so the UI is never stuck.
        let reconcile_policy = policy
            .clone()
            .with_max_attempts(settings.reconcile.max_attempts);

        let sessions = Arc::new(SessionProvider::new(auth));
        let join = Arc::new(JoinCoordinator::new(
            Arc::clone(&sessions),
            Arc::clone(&store),
            policy,
        ));
        let resolver = Arc::new(MembershipResolver::new(store, reconcile_policy));
        let apartment = ApartmentState::new();
        let reconciler = Arc::new(PostAuthReconciler::new(
            Arc::clone(&sessions),
            resolver,
            Arc::clone(&join),
            apartment.clone(),
            settings.reconcile.timeout(),
        ));

        Self {
            settings: Arc::new(settings),
            sessions,
            join,
            reconciler,
            apartment,
        }
    }
}
