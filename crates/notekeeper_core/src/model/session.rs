//! Session credentials.

/// Durable storage key for the credential string.
pub const TOKEN_KEY: &str = "token";
/// Durable storage key for the user identifier.
pub const USER_ID_KEY: &str = "userId";

/// Logged-in half of the session: token and user id always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    /// `Authorization` header value for this credential.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
