//! End-to-end login flows against the public API.
//!
//! Each test drives the login form the way the terminal client does: build a
//! validator, hydrate a session store over real file storage, submit, and
//! then restart the store to check what survived.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use serde_json::json;
use shiftgate::auth::{
    policy, token, AuthError, CredentialValidator, Directory, Field, FieldError, FieldErrors,
    FileStorage, FormState, LoginForm, RemoteAuthority, Role, SessionStore,
};
use std::{net::TcpListener, time::Duration};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

struct Client {
    _dir: tempfile::TempDir,
    storage: FileStorage,
    store: SessionStore,
}

impl Client {
    fn start() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());
        let mut store = SessionStore::new(storage.clone());
        store.init();
        Ok(Self {
            _dir: dir,
            storage,
            store,
        })
    }

    fn restart(&mut self) {
        let store = std::mem::replace(
            &mut self.store,
            SessionStore::new(self.storage.clone()),
        );
        store.teardown();
        self.store.init();
    }
}

async fn submit(
    client: &mut Client,
    validator: &CredentialValidator,
    username: &str,
    password: &str,
) -> FormState {
    let mut form = LoginForm::new();
    form.set_username(username);
    form.set_password(password);
    let state = form.submit(validator, &mut client.store).await.clone();
    state
}

#[tokio::test]
async fn admin_login_persists_across_restart() -> Result<()> {
    let mut client = Client::start()?;
    let validator = CredentialValidator::Local(Directory::builtin());

    let state = submit(&mut client, &validator, "admin", "admin123").await;
    assert_eq!(state, FormState::Success);

    let stored = client.store.get().expect("session stored");
    assert_eq!(stored.user.role, Role::Admin);
    assert_eq!(token::decode(&stored.token)?.user_id, stored.user.id);

    client.restart();
    assert_eq!(client.store.get(), Some(stored.clone()));
    assert!(policy::can_access(&stored.user, Role::Empleado));

    client.store.clear()?;
    client.restart();
    assert_eq!(client.store.get(), None);
    Ok(())
}

#[tokio::test]
async fn wrong_password_leaves_session_untouched() -> Result<()> {
    let mut client = Client::start()?;
    let validator = CredentialValidator::Local(Directory::builtin());

    assert_eq!(
        submit(&mut client, &validator, "cajero", "cajero123").await,
        FormState::Success
    );
    let before = client.store.get();

    let state = submit(&mut client, &validator, "admin", "wrong").await;
    let FormState::Error(AuthError::Authentication(message)) = state else {
        panic!("expected an authentication error, got {state:?}");
    };
    assert!(message.contains("Invalid"));

    assert_eq!(client.store.get(), before);
    client.restart();
    assert_eq!(client.store.get(), before);
    Ok(())
}

#[tokio::test]
async fn corrupt_session_file_does_not_block_login() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path());
    std::fs::write(storage.path(), b"{not json")?;

    let mut client = Client {
        store: SessionStore::new(storage.clone()),
        storage,
        _dir: dir,
    };
    assert_eq!(client.store.init(), None);
    assert_ne!(std::fs::read(client.storage.path())?, b"{not json");

    let validator = CredentialValidator::Local(Directory::builtin());
    assert_eq!(
        submit(&mut client, &validator, "admin", "admin123").await,
        FormState::Success
    );

    client.restart();
    assert_eq!(client.store.get().map(|session| session.user.role), Some(Role::Admin));
    Ok(())
}

#[tokio::test]
async fn blank_username_never_reaches_the_server() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut client = Client::start()?;
    let validator = CredentialValidator::Remote(RemoteAuthority::new(&server.uri(), None)?);

    let state = submit(&mut client, &validator, "", "x").await;

    let mut expected = FieldErrors::new();
    expected.insert(Field::Username, FieldError::Required);
    assert_eq!(state, FormState::Error(AuthError::Validation(expected)));
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_reported() -> Result<()> {
    let mut client = Client::start()?;
    let validator = CredentialValidator::Local(Directory::builtin());

    let state = submit(&mut client, &validator, "ghost", "x").await;

    let FormState::Error(AuthError::Authentication(message)) = state else {
        panic!("expected an authentication error, got {state:?}");
    };
    assert!(message.contains("not found"));
    assert_eq!(client.store.get(), None);
    Ok(())
}

#[tokio::test]
async fn remote_login_stores_server_session() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let user = json!({
        "id": 42,
        "username": "empleado",
        "full_name": "Elena Morales",
        "email": "elena@pos.local",
        "role": "empleado",
        "shift": "mañana"
    });
    let issued = serde_json::from_value(user.clone())?;
    let server_token = token::encode(&issued, token::unix_now())?;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": server_token,
            "user": user,
        })))
        .mount(&server)
        .await;

    let mut client = Client::start()?;
    let validator = CredentialValidator::Remote(RemoteAuthority::new(
        &server.uri(),
        Some(Duration::from_secs(5)),
    )?);

    assert_eq!(
        submit(&mut client, &validator, "empleado", "secret").await,
        FormState::Success
    );

    client.restart();
    let session = client.store.get().expect("session restored");
    assert_eq!(session.token, server_token);
    assert_eq!(session.user.id, 42);
    assert!(!policy::can_access(&session.user, Role::Admin));
    Ok(())
}

#[tokio::test]
async fn unreachable_server_shows_retry_message() -> Result<()> {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return Ok(());
    }
    let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();
    let mut client = Client::start()?;
    let validator = CredentialValidator::Remote(RemoteAuthority::new(
        &format!("http://127.0.0.1:{port}"),
        Some(Duration::from_secs(5)),
    )?);

    let state = submit(&mut client, &validator, "admin", "admin123").await;

    assert!(matches!(state, FormState::Error(AuthError::Network(_))));
    assert_eq!(client.store.get(), None);
    Ok(())
}

#[test]
fn expired_session_is_cleared_on_access() -> Result<()> {
    let mut client = Client::start()?;
    let session = match shiftgate::auth::validator::authenticate_local(
        &Directory::builtin(),
        &shiftgate::auth::Credentials::new("viewer", "viewer123"),
        1_000,
    ) {
        shiftgate::auth::AuthOutcome::Authenticated(session) => session,
        other => panic!("expected viewer to authenticate, got {other:?}"),
    };
    client.store.set(session)?;

    client.restart();
    assert!(client.store.get().is_some());
    assert_eq!(client.store.active(1_000 + token::TOKEN_TTL_SECONDS + 1), None);

    client.restart();
    assert_eq!(client.store.get(), None);
    Ok(())
}
