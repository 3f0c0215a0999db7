#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::User;

/// Body the server attaches to every non-2xx answer. Rate limits (418) add
/// `retryAfter`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "retryAfter", alias = "retry_after")]
    pub retry_after: Option<u64>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

impl ErrorBody {
    pub fn parse(text: &str) -> ErrorBody {
        return serde_json::from_str(text).unwrap_or_default();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Mirrors the server side checks so obviously bad input never leaves the
    /// client.
    pub fn validate(&self) -> Option<String> {
        let username_len = self.username.trim().chars().count();
        if !(3..=50).contains(&username_len) {
            return Some("Username must be 3-50 characters".to_string());
        }
        if !self.email.contains('@') {
            return Some("Valid email is required".to_string());
        }
        if self.password.chars().count() < 6 {
            return Some("Password must be at least 6 characters".to_string());
        }

        return None;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: Option<String>,
    pub user: User,
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
}
