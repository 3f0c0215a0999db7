use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    /// Requests per minute the server allows before answering with a 418.
    pub rate_limit: Option<u32>,
    pub created_at: Option<String>,
}
