#[cfg(test)]
#[path = "session_context_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::RwLock;

use crate::domain::models::Session;
use crate::domain::models::SessionState;
use crate::domain::models::TokenPair;
use crate::domain::models::User;
use crate::domain::models::ACCESS_TOKEN_KEY;
use crate::domain::models::REFRESH_TOKEN_KEY;
use crate::infrastructure::storage::StoreBox;

/// Owns the current session and keeps the persisted tokens in step with it.
/// The in-memory session is always updated before storage is touched, so a
/// storage failure never leaves stale credentials in memory.
pub struct SessionContext {
    session: RwLock<Session>,
    store: StoreBox,
}

impl SessionContext {
    pub fn new(store: StoreBox) -> SessionContext {
        return SessionContext {
            session: RwLock::new(Session::default()),
            store,
        };
    }

    /// Loads persisted tokens. The user stays unset until the tokens are
    /// validated against the server.
    pub async fn hydrate(&self) -> Result<()> {
        let access_token = self.store.get(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.store.get(REFRESH_TOKEN_KEY)?;

        let mut session = self.session.write().await;
        *session = Session {
            access_token,
            refresh_token,
            user: None,
        };

        tracing::debug!(
            storage = self.store.name().to_string(),
            has_tokens = session.has_tokens(),
            "session hydrated"
        );

        return Ok(());
    }

    pub async fn snapshot(&self) -> Session {
        return self.session.read().await.clone();
    }

    pub async fn state(&self) -> SessionState {
        return self.session.read().await.state();
    }

    pub async fn access_token(&self) -> Option<String> {
        return self.session.read().await.access_token.clone();
    }

    pub async fn refresh_token(&self) -> Option<String> {
        return self.session.read().await.refresh_token.clone();
    }

    pub async fn user(&self) -> Option<User> {
        return self.session.read().await.user.clone();
    }

    pub async fn authenticate(&self, tokens: TokenPair, user: User) -> Result<()> {
        {
            let mut session = self.session.write().await;
            *session = Session {
                access_token: Some(tokens.access_token.to_string()),
                refresh_token: Some(tokens.refresh_token.to_string()),
                user: Some(user),
            };
        }

        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token)?;

        return Ok(());
    }

    /// Swaps the access token after a refresh. User and refresh token are
    /// left untouched.
    pub async fn set_access_token(&self, access_token: &str) -> Result<()> {
        {
            let mut session = self.session.write().await;
            session.access_token = Some(access_token.to_string());
        }

        self.store.set(ACCESS_TOKEN_KEY, access_token)?;

        return Ok(());
    }

    /// Marks the current tokens as validated for `user`.
    pub async fn set_user(&self, user: User) {
        let mut session = self.session.write().await;
        if session.access_token.is_none() {
            tracing::warn!("refusing to set a user without an access token");
            return;
        }

        session.user = Some(user);
    }

    pub async fn clear(&self) -> Result<()> {
        {
            let mut session = self.session.write().await;
            *session = Session::default();
        }

        let access_res = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh_res = self.store.remove(REFRESH_TOKEN_KEY);
        access_res?;
        refresh_res?;

        return Ok(());
    }
}
