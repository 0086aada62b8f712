//! JSON bodies of the notes API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `POST /auth/register` and `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_id: String,
}

/// `GET /` body.
#[derive(Debug, Clone, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Extracts `detail` from a FastAPI-style error body.
///
/// `detail` is either a string or a list of `{ "msg": ... }` entries; the
/// first message wins.
pub fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}
