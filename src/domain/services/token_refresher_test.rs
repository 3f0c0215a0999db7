use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use super::TokenRefresher;
use crate::domain::models::KeyValueStore;
use crate::domain::models::TokenPair;
use crate::domain::models::User;
use crate::domain::services::gateway::build_http_client;
use crate::domain::services::SessionContext;
use crate::infrastructure::storage::memory::MemoryStore;

fn user() -> User {
    return User {
        id: "1".to_string(),
        username: "johndoe".to_string(),
        email: None,
        rate_limit: None,
        created_at: None,
    };
}

async fn authenticated_session() -> Result<Arc<SessionContext>> {
    let session = Arc::new(SessionContext::new(Box::<MemoryStore>::default()));
    session
        .authenticate(
            TokenPair {
                access_token: "stale-access".to_string(),
                refresh_token: "refresh-1".to_string(),
            },
            user(),
        )
        .await?;
    return Ok(session);
}

fn refresher(url: &str, session: &Arc<SessionContext>) -> Result<TokenRefresher> {
    let http = build_http_client(Duration::from_millis(2000))?;
    return Ok(TokenRefresher::new(
        &format!("{url}/api/v1"),
        http,
        Arc::clone(session),
    ));
}

#[tokio::test]
async fn it_stores_the_new_access_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/auth/refresh")
        .match_header("authorization", "Bearer refresh-1")
        .with_status(200)
        .with_body(json!({ "access_token": "fresh-access" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let session = authenticated_session().await?;
    let res = refresher(&server.url(), &session)?.refresh().await;

    assert!(res);
    mock.assert_async().await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.access_token, Some("fresh-access".to_string()));
    assert_eq!(snapshot.refresh_token, Some("refresh-1".to_string()));
    assert_eq!(snapshot.user, Some(user()));
    return Ok(());
}

#[tokio::test]
async fn it_persists_the_new_access_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(200)
        .with_body(json!({ "accessToken": "fresh-access" }).to_string())
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::default());
    let session = Arc::new(SessionContext::new(Box::new(SharedStore(Arc::clone(&store)))));
    session
        .authenticate(
            TokenPair {
                access_token: "stale-access".to_string(),
                refresh_token: "refresh-1".to_string(),
            },
            user(),
        )
        .await?;

    assert!(refresher(&server.url(), &session)?.refresh().await);
    assert_eq!(store.get("accessToken")?, Some("fresh-access".to_string()));
    assert_eq!(store.get("refreshToken")?, Some("refresh-1".to_string()));
    return Ok(());
}

#[tokio::test]
async fn it_logs_out_when_refresh_is_rejected() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(401)
        .with_body(json!({ "code": "UNAUTHORIZED", "message": "Token has expired" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let session = authenticated_session().await?;
    let res = refresher(&server.url(), &session)?.refresh().await;

    assert!(!res);
    mock.assert_async().await;
    assert!(session.snapshot().await.is_cleared());
    return Ok(());
}

#[tokio::test]
async fn it_logs_out_on_unexpected_bodies() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let session = authenticated_session().await?;
    assert!(!refresher(&server.url(), &session)?.refresh().await);
    assert!(session.snapshot().await.is_cleared());
    return Ok(());
}

#[tokio::test]
async fn it_logs_out_when_the_server_is_unreachable() -> Result<()> {
    let session = authenticated_session().await?;
    let res = refresher("http://127.0.0.1:1", &session)?.refresh().await;

    assert!(!res);
    assert!(session.snapshot().await.is_cleared());
    return Ok(());
}

#[tokio::test]
async fn it_fails_without_a_refresh_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/auth/refresh")
        .expect(0)
        .create_async()
        .await;

    let session = Arc::new(SessionContext::new(Box::<MemoryStore>::default()));
    assert!(!refresher(&server.url(), &session)?.refresh().await);
    mock.assert_async().await;
    assert!(session.snapshot().await.is_cleared());
    return Ok(());
}

/// Lets a test inspect the store after handing it to a session.
struct SharedStore(Arc<MemoryStore>);

impl KeyValueStore for SharedStore {
    fn name(&self) -> crate::domain::models::StorageName {
        return self.0.name();
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        return self.0.get(key);
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        return self.0.set(key, value);
    }

    fn remove(&self, key: &str) -> Result<()> {
        return self.0.remove(key);
    }
}
