#[cfg(test)]
#[path = "token_refresher_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use reqwest::header;

use super::gateway::join_url;
use super::SessionContext;
use crate::domain::models::RefreshResponse;

/// Exchanges the refresh token for a new access token. Talks to the API
/// directly rather than through the gateway, so a failed refresh can never
/// trigger another refresh.
pub struct TokenRefresher {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionContext>,
}

impl TokenRefresher {
    pub fn new(base_url: &str, http: reqwest::Client, session: Arc<SessionContext>) -> TokenRefresher {
        return TokenRefresher {
            base_url: base_url.to_string(),
            http,
            session,
        };
    }

    async fn exchange(&self, refresh_token: &str) -> Result<String> {
        let res = self
            .http
            .post(join_url(&self.base_url, "/auth/refresh"))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(refresh_token)
            .send()
            .await?;

        if !res.status().is_success() {
            bail!("Refresh endpoint answered with status {}", res.status().as_u16());
        }

        let body = res.json::<RefreshResponse>().await?;
        if body.access_token.is_empty() {
            bail!("Refresh endpoint returned an empty access token");
        }

        return Ok(body.access_token);
    }

    /// Returns `false` after clearing the session when no new access token
    /// could be obtained.
    pub async fn refresh(&self) -> bool {
        let refresh_token = match self.session.refresh_token().await {
            Some(token) => token,
            None => {
                tracing::warn!("no refresh token available, logging out");
                self.logout().await;
                return false;
            }
        };

        match self.exchange(&refresh_token).await {
            Ok(access_token) => {
                if let Err(err) = self.session.set_access_token(&access_token).await {
                    tracing::error!(error = ?err, "failed to persist refreshed access token");
                }
                tracing::debug!("access token refreshed");
                return true;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "token refresh failed, logging out");
                self.logout().await;
                return false;
            }
        }
    }

    async fn logout(&self) {
        if let Err(err) = self.session.clear().await {
            tracing::error!(error = ?err, "failed to clear persisted credentials");
        }
    }
}
