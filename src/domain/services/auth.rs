#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;

use super::Gateway;
use super::Outcome;
use super::PendingRequest;
use crate::domain::models::AuthResponse;
use crate::domain::models::Event;
use crate::domain::models::LoginRequest;
use crate::domain::models::Notice;
use crate::domain::models::RegisterRequest;
use crate::domain::models::SessionState;
use crate::domain::models::TokenPair;
use crate::domain::models::User;

pub struct AuthService {
    gateway: Arc<Gateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<Gateway>) -> AuthService {
        return AuthService { gateway };
    }

    async fn establish(&self, res: AuthResponse) -> Result<User> {
        let tokens = TokenPair {
            access_token: res.access_token,
            refresh_token: res.refresh_token,
        };

        if let Err(err) = self.gateway.session().authenticate(tokens, res.user.clone()).await {
            tracing::error!(error = ?err, "failed to persist credentials");
            self.gateway.notify(Notice::warning(
                "Credentials could not be saved, you will need to log in again next time.",
            ))?;
        }

        tracing::debug!(user_id = %res.user.id, "session established");
        self.gateway
            .emit(Event::SessionChanged(SessionState::Authenticated))?;

        return Ok(res.user);
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>> {
        let body = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        if body.username.is_empty() || body.password.is_empty() {
            self.gateway
                .notify(Notice::warning("Username and password are required"))?;
            return Ok(None);
        }

        let req = PendingRequest::post("/auth/login")
            .with_json(&body)?
            .anonymous();
        let res = match self.gateway.perform_json::<AuthResponse>(&req).await? {
            Some(res) => res,
            None => return Ok(None),
        };

        let user = self.establish(res).await?;
        self.gateway
            .notify(Notice::info(&format!("Logged in as {}.", user.username)))?;

        return Ok(Some(user));
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let body = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        if let Some(problem) = body.validate() {
            self.gateway.notify(Notice::warning(&problem))?;
            return Ok(None);
        }

        let req = PendingRequest::post("/auth/register")
            .with_json(&body)?
            .anonymous();
        let res = match self.gateway.perform_json::<AuthResponse>(&req).await? {
            Some(res) => res,
            None => return Ok(None),
        };

        let user = self.establish(res).await?;
        self.gateway.notify(Notice::info(&format!(
            "Welcome {}, your account has been created.",
            user.username
        )))?;

        return Ok(Some(user));
    }

    /// Local only, the API keeps no server side session to end.
    pub async fn logout(&self) -> Result<()> {
        if let Err(err) = self.gateway.session().clear().await {
            tracing::error!(error = ?err, "failed to remove persisted credentials");
            self.gateway
                .notify(Notice::warning("Saved credentials could not be removed."))?;
        }

        self.gateway
            .emit(Event::SessionChanged(SessionState::Anonymous))?;
        self.gateway.notify(Notice::info("Logged out."))?;

        return Ok(());
    }

    async fn fetch_me(&self) -> Result<Outcome<User>> {
        let outcome = self
            .gateway
            .execute_json::<User>(&PendingRequest::get("/auth/me"))
            .await?;
        if let Outcome::Done(user) = &outcome {
            self.gateway.session().set_user(user.clone()).await;
        }

        return Ok(outcome);
    }

    pub async fn whoami(&self) -> Result<Option<User>> {
        return Ok(self.fetch_me().await?.ok());
    }

    /// Startup transition. Persisted tokens only count once `/auth/me`
    /// accepts them, possibly after a refresh. They are only dropped when the
    /// server refuses them; being offline or rate limited keeps them for the
    /// next run.
    pub async fn restore(&self) -> Result<SessionState> {
        let session = self.gateway.session();
        if let Err(err) = session.hydrate().await {
            tracing::warn!(error = ?err, "failed to read persisted credentials");
        }

        if !session.snapshot().await.has_tokens() {
            tracing::debug!("no persisted credentials");
            return Ok(SessionState::Anonymous);
        }

        let failure = match self.fetch_me().await? {
            Outcome::Done(_) => {
                self.gateway
                    .emit(Event::SessionChanged(SessionState::Authenticated))?;
                return Ok(SessionState::Authenticated);
            }
            Outcome::Failed(failure) => failure,
        };

        if !failure.rejects_credentials() {
            tracing::warn!(failure = ?failure, "could not validate persisted credentials, keeping them");
            return Ok(SessionState::Anonymous);
        }

        // A failed refresh has already cleared and announced the session.
        if !session.snapshot().await.is_cleared() {
            if let Err(err) = session.clear().await {
                tracing::error!(error = ?err, "failed to remove persisted credentials");
            }
            self.gateway
                .emit(Event::SessionChanged(SessionState::Anonymous))?;
        }

        return Ok(SessionState::Anonymous);
    }
}
