//! Client-facing error taxonomy.
//!
//! # Responsibility
//! - Classify every failure a user action can end in.
//! - Give view controllers one enum to match exhaustively.
//!
//! # Invariants
//! - `Validation` is produced before any request leaves the client.
//! - `AuthInvalid` is only returned after the session has been cleared.
//! - No variant triggers a retry; every failure is terminal for its action.

use crate::repo::session_repo::RepoError;
use crate::service::session_store::SessionError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ClientResult<T> = Result<T, ClientError>;

/// Required-field and format checks done on the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace only.
    MissingField(&'static str),
    /// Email input does not look like an address.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Outcome classes for gateway, sync and view operations.
#[derive(Debug)]
pub enum ClientError {
    /// Blocked client-side; nothing was sent.
    Validation(ValidationError),
    /// Server answered 401 on an authenticated call; session is now cleared.
    AuthInvalid,
    /// Any other non-2xx response or transport failure.
    Failed {
        status: Option<u16>,
        message: String,
    },
    /// 2xx response whose body could not be read. The server did handle the call.
    UnreadableBody { status: u16, message: String },
    /// Durable session storage could not be read or written.
    Storage(SessionError),
}

impl ClientError {
    pub fn failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Failed {
            status,
            message: message.into(),
        }
    }

    /// HTTP status when the failure came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Failed { status, .. } => *status,
            Self::UnreadableBody { status, .. } => Some(*status),
            Self::AuthInvalid => Some(401),
            Self::Validation(_) | Self::Storage(_) => None,
        }
    }

    pub fn is_auth_invalid(&self) -> bool {
        matches!(self, Self::AuthInvalid)
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::AuthInvalid => write!(f, "session is no longer valid"),
            Self::Failed { message, .. } => write!(f, "{message}"),
            Self::UnreadableBody { message, .. } => {
                write!(f, "unexpected response body: {message}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::AuthInvalid | Self::Failed { .. } | Self::UnreadableBody { .. } => None,
        }
    }
}

impl From<ValidationError> for ClientError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SessionError> for ClientError {
    fn from(value: SessionError) -> Self {
        Self::Storage(value)
    }
}

impl From<RepoError> for ClientError {
    fn from(value: RepoError) -> Self {
        Self::Storage(SessionError::Repo(value))
    }
}
