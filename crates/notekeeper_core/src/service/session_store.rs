//! Session store: the single owner of the client's authenticated identity.
//!
//! # Responsibility
//! - Resume a persisted session at startup without contacting the server.
//! - Apply login/logout to durable storage and memory as one step.
//!
//! # Invariants
//! - Token and user id are both present or both absent.
//! - Memory changes on login only after the durable write committed.
//! - Logout always clears memory, even when the durable delete fails.

use crate::model::session::Credentials;
use crate::repo::session_repo::{RepoError, SessionRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Session store failure.
#[derive(Debug)]
pub enum SessionError {
    /// Login was called with an empty token or user id.
    EmptyCredential(&'static str),
    /// Durable storage failed.
    Repo(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCredential(field) => write!(f, "session {field} must not be empty"),
            Self::Repo(err) => write!(f, "session storage failed: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyCredential(_) => None,
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Holds the current session and mirrors it to durable storage.
pub struct SessionStore<R: SessionRepository> {
    repo: R,
    current: Option<Credentials>,
}

impl<R: SessionRepository> SessionStore<R> {
    /// Establishes initial state from durable storage.
    ///
    /// A half-written pair (one key without the other) is discarded and the
    /// store starts logged out.
    pub fn open(mut repo: R) -> Result<Self, SessionError> {
        let stored = repo.load_session()?;
        let was_empty = stored.is_empty();
        let current = stored.into_credentials();

        if current.is_none() && !was_empty {
            warn!("event=session_resume module=session status=error error_code=partial_session");
            repo.clear_session()?;
        }

        info!(
            "event=session_resume module=session status=ok authenticated={}",
            current.is_some()
        );
        Ok(Self { repo, current })
    }

    /// Stores both values durably, then publishes them in memory.
    pub fn login(
        &mut self,
        token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<(), SessionError> {
        let credentials = Credentials::new(token, user_id);
        if credentials.token.is_empty() {
            return Err(SessionError::EmptyCredential("token"));
        }
        if credentials.user_id.is_empty() {
            return Err(SessionError::EmptyCredential("user id"));
        }

        if let Err(err) = self.repo.save_session(&credentials) {
            error!(
                "event=session_login module=session status=error error_code=persist_failed error={}",
                err
            );
            return Err(err.into());
        }
        info!(
            "event=session_login module=session status=ok user_id={}",
            credentials.user_id
        );
        self.current = Some(credentials);
        Ok(())
    }

    /// Clears durable storage and memory.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let was_authenticated = self.current.take().is_some();
        match self.repo.clear_session() {
            Ok(()) => {
                info!(
                    "event=session_logout module=session status=ok was_authenticated={}",
                    was_authenticated
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_logout module=session status=error error_code=clear_failed error={}",
                    err
                );
                Err(err.into())
            }
        }
    }

    /// True iff a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|credentials| credentials.token.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|credentials| credentials.user_id.as_str())
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.current.as_ref()
    }

    /// Borrow the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }
}
