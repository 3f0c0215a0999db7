#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use reqwest::header;
use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::SessionContext;
use super::TokenRefresher;
use crate::domain::models::ErrorBody;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::SessionState;

/// How many times a request is replayed after a successful token refresh.
pub const MAX_AUTH_RETRIES: usize = 1;

/// Why a call produced no value. The matching notice has already been sent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    Unreachable,
    RateLimited,
    /// The refresh token was refused and the session is gone.
    SessionExpired,
    Rejected(u16),
    Unreadable,
}

impl Failure {
    /// The server looked at the credentials and refused them. Anything else
    /// says nothing about whether the stored tokens are still good.
    pub fn rejects_credentials(&self) -> bool {
        return matches!(
            self,
            Failure::SessionExpired
                | Failure::Rejected(401)
                | Failure::Rejected(403)
                | Failure::Rejected(404)
        );
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Failed(Failure),
}

impl<T> Outcome<T> {
    pub fn ok(self) -> Option<T> {
        return match self {
            Outcome::Done(value) => Some(value),
            Outcome::Failed(_) => None,
        };
    }
}

/// An outbound call. Owned by whoever issues it and never shared.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// Unauthenticated requests never carry a bearer token and never trigger
    /// a refresh.
    pub authenticated: bool,
}

impl PendingRequest {
    pub fn new(method: Method, path: &str) -> PendingRequest {
        return PendingRequest {
            method,
            path: path.to_string(),
            query: vec![],
            body: None,
            headers: vec![],
            authenticated: true,
        };
    }

    pub fn get(path: &str) -> PendingRequest {
        return PendingRequest::new(Method::GET, path);
    }

    pub fn post(path: &str) -> PendingRequest {
        return PendingRequest::new(Method::POST, path);
    }

    pub fn patch(path: &str) -> PendingRequest {
        return PendingRequest::new(Method::PATCH, path);
    }

    pub fn delete(path: &str) -> PendingRequest {
        return PendingRequest::new(Method::DELETE, path);
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<PendingRequest> {
        self.body = Some(serde_json::to_value(body)?);
        return Ok(self);
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> PendingRequest {
        self.query = pairs;
        return self;
    }

    pub fn anonymous(mut self) -> PendingRequest {
        self.authenticated = false;
        return self;
    }
}

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("waymark/{}", env!("CARGO_PKG_VERSION")))
        .build()?;

    return Ok(client);
}

/// Builds a path from raw segments, percent-encoding each one so user input
/// can never reach into the query or fragment.
pub fn encode_path(segments: &[&str]) -> Result<String> {
    let mut url = reqwest::Url::parse("http://localhost/")?;
    url.path_segments_mut()
        .map_err(|_| return anyhow!("url cannot hold a path"))?
        .pop_if_empty()
        .extend(segments);

    return Ok(url.path().to_string());
}

pub fn join_url(base_url: &str, path: &str) -> String {
    return format!(
        "{base}/{path}",
        base = base_url.trim_end_matches('/'),
        path = path.trim_start_matches('/')
    );
}

/// Wraps every call to the API. Protocol failures are reported as notices on
/// the event channel and turned into `Ok(None)`; `Err` is reserved for faults
/// inside the client itself.
pub struct Gateway {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionContext>,
    refresher: TokenRefresher,
    tx: mpsc::UnboundedSender<Event>,
}

impl Gateway {
    pub fn new(
        base_url: &str,
        http: reqwest::Client,
        session: Arc<SessionContext>,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Gateway {
        let refresher = TokenRefresher::new(base_url, http.clone(), Arc::clone(&session));

        return Gateway {
            base_url: base_url.to_string(),
            http,
            session,
            refresher,
            tx,
        };
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        return &self.session;
    }

    pub fn notify(&self, notice: Notice) -> Result<()> {
        self.tx.send(Event::Notice(notice))?;
        return Ok(());
    }

    pub fn emit(&self, event: Event) -> Result<()> {
        self.tx.send(event)?;
        return Ok(());
    }

    async fn send(
        &self,
        req: &PendingRequest,
        access_token: Option<&str>,
    ) -> reqwest::Result<reqwest::Response> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(
            method = req.method.as_str(),
            path = %req.path,
            request_id = %request_id,
            authenticated = access_token.is_some(),
            "api request"
        );

        let mut builder = self
            .http
            .request(req.method.clone(), join_url(&self.base_url, &req.path))
            .header(header::ACCEPT, "application/json")
            .header("X-Request-ID", request_id);

        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        return builder.send().await;
    }

    pub async fn execute(&self, req: &PendingRequest) -> Result<Outcome<serde_json::Value>> {
        let mut auth_retries = 0;

        loop {
            let access_token = if req.authenticated {
                self.session.access_token().await
            } else {
                None
            };

            let res = match self.send(req, access_token.as_deref()).await {
                Ok(res) => res,
                Err(err) => {
                    tracing::error!(error = ?err, path = %req.path, "api request failed");
                    let text = if err.is_timeout() {
                        "The server took too long to answer. Please try again.".to_string()
                    } else {
                        format!("Could not reach the server: {err}")
                    };
                    self.notify(Notice::error(&text))?;
                    return Ok(Outcome::Failed(Failure::Unreachable));
                }
            };

            let status = res.status();
            tracing::debug!(status = status.as_u16(), path = %req.path, "api response");

            if status == StatusCode::IM_A_TEAPOT {
                let header_retry = res
                    .headers()
                    .get(header::RETRY_AFTER)
                    .and_then(|e| return e.to_str().ok())
                    .and_then(|e| return e.trim().parse::<u64>().ok());
                let body = ErrorBody::parse(&res.text().await.unwrap_or_default());
                let retry_after = body.retry_after.or(header_retry);

                tracing::warn!(retry_after = ?retry_after, path = %req.path, "rate limited");
                self.notify(Notice::rate_limited(
                    &body.message.unwrap_or_default(),
                    retry_after,
                ))?;
                return Ok(Outcome::Failed(Failure::RateLimited));
            }

            if status == StatusCode::UNAUTHORIZED
                && req.authenticated
                && auth_retries < MAX_AUTH_RETRIES
                && self.session.refresh_token().await.is_some()
            {
                auth_retries += 1;
                if self.refresher.refresh().await {
                    tracing::debug!(path = %req.path, "retrying after token refresh");
                    continue;
                }

                self.notify(Notice::error(
                    "Your session has expired. Please log in again.",
                ))?;
                self.emit(Event::SessionChanged(SessionState::Anonymous))?;
                return Ok(Outcome::Failed(Failure::SessionExpired));
            }

            if !status.is_success() {
                let body = ErrorBody::parse(&res.text().await.unwrap_or_default());
                let text = body.message.unwrap_or_else(|| {
                    return format!(
                        "Request failed with status {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("")
                    );
                });

                tracing::warn!(
                    status = status.as_u16(),
                    code = ?body.code,
                    request_id = ?body.request_id,
                    "api error"
                );
                self.notify(Notice::error(&text))?;
                return Ok(Outcome::Failed(Failure::Rejected(status.as_u16())));
            }

            let text = match res.text().await {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = ?err, "failed to read response body");
                    self.notify(Notice::error(&format!("Could not read the server response: {err}")))?;
                    return Ok(Outcome::Failed(Failure::Unreachable));
                }
            };

            if text.trim().is_empty() {
                return Ok(Outcome::Done(serde_json::Value::Null));
            }

            return match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => Ok(Outcome::Done(value)),
                Err(err) => {
                    tracing::error!(error = ?err, "response was not json");
                    self.notify(Notice::error("The server sent a response that could not be understood."))?;
                    Ok(Outcome::Failed(Failure::Unreadable))
                }
            };
        }
    }

    pub async fn perform(&self, req: &PendingRequest) -> Result<Option<serde_json::Value>> {
        return Ok(self.execute(req).await?.ok());
    }

    pub async fn execute_json<T: DeserializeOwned>(&self, req: &PendingRequest) -> Result<Outcome<T>> {
        let value = match self.execute(req).await? {
            Outcome::Done(value) => value,
            Outcome::Failed(failure) => return Ok(Outcome::Failed(failure)),
        };

        return match serde_json::from_value::<T>(value) {
            Ok(res) => Ok(Outcome::Done(res)),
            Err(err) => {
                tracing::error!(error = ?err, path = %req.path, "unexpected response shape");
                self.notify(Notice::error(
                    "The server sent a response that could not be understood.",
                ))?;
                Ok(Outcome::Failed(Failure::Unreadable))
            }
        };
    }

    pub async fn perform_json<T: DeserializeOwned>(&self, req: &PendingRequest) -> Result<Option<T>> {
        return Ok(self.execute_json::<T>(req).await?.ok());
    }
}
