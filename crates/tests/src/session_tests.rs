use std::sync::Arc;

use futures::future::join_all;
use homebase_config::AuthSettings;
use homebase_services::SessionProvider;
use homebase_services::auth::{
    AuthBackend, AuthError, CredentialStore, FileCredentialStore, IssuedToken,
    MemoryCredentialStore, Session, StoredCredential, TokenAuthClient,
};

use crate::fixtures::memory_store::MemoryStore;
use crate::fixtures::server::FakeServer;
use crate::fixtures::token_issuer;

async fn server_with_account() -> FakeServer {
    let server = FakeServer::spawn(Arc::new(MemoryStore::new())).await;
    server.add_account("u1@example.com", "hunter2", "u1");
    server
}

fn client(server: &FakeServer, credentials: Arc<MemoryCredentialStore>) -> TokenAuthClient {
    let settings = AuthSettings {
        base_url: server.base_url.clone(),
        api_key: Some("test-key".to_string()),
        credentials_path: None,
    };
    TokenAuthClient::new(&settings, credentials)
}

#[tokio::test]
async fn sign_in_then_mint_fresh_tokens() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    let sessions = SessionProvider::new(Arc::new(client(&server, credentials.clone())));

    let signed_in = sessions
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(signed_in.uid, "u1");
    assert!(!signed_in.is_expired());

    let session = sessions.require_session().await.unwrap();
    assert_eq!(session.uid, "u1");
    assert_eq!(token_issuer::verify(&session.token).as_deref(), Some("u1"));
    assert_ne!(session.token, signed_in.token);
}

#[tokio::test]
async fn refresh_token_rotates_on_every_mint() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    let sessions = SessionProvider::new(Arc::new(client(&server, credentials.clone())));

    sessions
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();
    let first = credentials.load().unwrap().expect("credential persisted");

    sessions.require_session().await.unwrap();
    let second = credentials.load().unwrap().expect("credential persisted");

    assert_eq!(second.uid, "u1");
    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(server.refresh_token_count(), 1);
}

#[tokio::test]
async fn persisted_session_is_restored_by_a_new_client() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());

    let first_run = client(&server, credentials.clone());
    first_run
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();

    let second_run = client(&server, credentials.clone());
    assert_eq!(second_run.current_uid(), None);

    let sessions = SessionProvider::new(Arc::new(second_run));
    let session = sessions.require_session().await.unwrap();
    assert_eq!(session.uid, "u1");
}

#[tokio::test]
async fn concurrent_restores_share_one_refresh_chain() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    client(&server, credentials.clone())
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();

    let sessions = SessionProvider::new(Arc::new(client(&server, credentials.clone())));
    let results = join_all((0..3).map(|_| sessions.require_session())).await;

    for result in results {
        assert_eq!(result.unwrap().uid, "u1");
    }
    assert_eq!(server.refresh_token_count(), 1);
}

#[tokio::test]
async fn nothing_persisted_requires_authentication() {
    let server = server_with_account().await;
    let sessions = SessionProvider::new(Arc::new(client(
        &server,
        Arc::new(MemoryCredentialStore::default()),
    )));

    assert!(sessions.require_session().await.is_err());
}

#[tokio::test]
async fn revoked_refresh_token_requires_authentication() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    let sessions = SessionProvider::new(Arc::new(client(&server, credentials.clone())));
    sessions
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();

    server.revoke_refresh_tokens();

    assert!(sessions.require_session().await.is_err());
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    let auth = client(&server, credentials.clone());

    let err = auth
        .sign_in("u1@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(credentials.load().unwrap(), None);
}

#[tokio::test]
async fn sign_out_forgets_credentials() {
    let server = server_with_account().await;
    let credentials = Arc::new(MemoryCredentialStore::default());
    let sessions = SessionProvider::new(Arc::new(client(&server, credentials.clone())));
    sessions
        .sign_in("u1@example.com", "hunter2")
        .await
        .unwrap();

    sessions.sign_out().await.unwrap();

    assert_eq!(credentials.load().unwrap(), None);
    assert!(sessions.require_session().await.is_err());
}

#[tokio::test]
async fn unreachable_token_service_requires_authentication() {
    let credentials = Arc::new(MemoryCredentialStore::default());
    credentials
        .save(&StoredCredential {
            uid: "u1".to_string(),
            refresh_token: "r1".to_string(),
        })
        .unwrap();
    let settings = AuthSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: None,
        credentials_path: None,
    };
    let sessions = SessionProvider::new(Arc::new(TokenAuthClient::new(&settings, credentials)));

    assert!(sessions.require_session().await.is_err());
}

#[test]
fn file_credentials_survive_a_reload() {
    let dir = std::env::temp_dir().join(format!("homebase-test-{}", uuid::Uuid::new_v4()));
    let store = FileCredentialStore::new(dir.join("nested").join("credentials.json"));
    let credential = StoredCredential {
        uid: "u1".to_string(),
        refresh_token: "r1".to_string(),
    };

    assert_eq!(store.load().unwrap(), None);
    store.save(&credential).unwrap();

    let reopened = FileCredentialStore::new(store.path());
    assert_eq!(reopened.load().unwrap(), Some(credential));

    reopened.clear().unwrap();
    reopened.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn corrupt_credential_file_is_an_error() {
    let dir = std::env::temp_dir().join(format!("homebase-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("credentials.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let err = FileCredentialStore::new(&path).load().unwrap_err();
    assert!(matches!(err, AuthError::Credentials(_)));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn session_lifetime_is_clamped() {
    let session = Session::from_issued(IssuedToken {
        uid: "u1".to_string(),
        token: "t".to_string(),
        expires_in: u64::MAX,
    });
    let day = chrono::Duration::hours(24) + chrono::Duration::seconds(5);
    assert!(session.expires_at <= chrono::Utc::now() + day);

    let expired = Session::from_issued(IssuedToken {
        uid: "u1".to_string(),
        token: "t".to_string(),
        expires_in: 0,
    });
    assert!(expired.is_expired());
}
