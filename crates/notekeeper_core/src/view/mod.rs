//! View controllers: form state and dispatch, no rendering.
//!
//! # Responsibility
//! - Hold view-local state (drafts, form fields, modal visibility, banners).
//! - Validate input before dispatching to the session store or note sync.
//! - Report navigation as explicit `ViewOutcome` values.
//!
//! # Invariants
//! - A `ClientError::AuthInvalid` always yields a redirect to `Route::Login`.
//! - Drafts are never persisted.

pub mod dashboard;
pub mod login;
pub mod register;
pub mod router;

use crate::error::ValidationError;
use crate::model::note::{Note, NoteId, NoteInput};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

pub use dashboard::Dashboard;
pub use login::LoginForm;
pub use register::RegisterForm;
pub use router::{navigation_links, resolve_route, NavLink, Route};

pub const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please log in again.";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// What the shell should do after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    Stay,
    Redirect {
        route: Route,
        /// One-shot notification to show the user (e.g. session expiry).
        notice: Option<String>,
        /// Delay before navigating, when the view wants its message read first.
        delay: Option<Duration>,
    },
}

impl ViewOutcome {
    pub fn redirect(route: Route) -> Self {
        Self::Redirect {
            route,
            notice: None,
            delay: None,
        }
    }

    pub fn session_expired() -> Self {
        Self::Redirect {
            route: Route::Login,
            notice: Some(SESSION_EXPIRED_NOTICE.to_string()),
            delay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Inline status line under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    /// Formats as `Error: <detail>`.
    pub fn error(detail: impl AsRef<str>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: format!("Error: {}", detail.as_ref()),
        }
    }
}

/// Unsaved note edit held by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub editing_id: Option<NoteId>,
}

impl Draft {
    /// Draft pre-filled from an existing note.
    pub fn for_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            editing_id: Some(note.id.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// Validated request body built from this draft.
    pub fn to_input(&self) -> Result<NoteInput, ValidationError> {
        NoteInput::new(self.title.clone(), self.content.clone())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Shared email/password check for the login and register forms.
pub(crate) fn validate_credentials_input(email: &str, password: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}
