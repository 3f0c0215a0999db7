#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use super::User;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Credentials and identity of the person using the client. A user is only
/// ever set once an access token has been validated against the server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn state(&self) -> SessionState {
        if self.user.is_some() {
            return SessionState::Authenticated;
        }

        return SessionState::Anonymous;
    }

    pub fn has_tokens(&self) -> bool {
        return self.access_token.is_some() || self.refresh_token.is_some();
    }

    pub fn is_cleared(&self) -> bool {
        return self == &Session::default();
    }
}
