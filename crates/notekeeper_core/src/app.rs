//! Composition root: wires storage, session, transport and sync from config.

use crate::api::{AuthGateway, ReqwestTransport};
use crate::config::{ClientConfig, ConfigError};
use crate::db::{open_db, DbError};
use crate::repo::session_repo::{RepoError, SqliteSessionRepository};
use crate::service::session_store::{SessionError, SessionStore};
use crate::sync::note_sync::NoteSync;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sync stack used by real front ends.
pub type HttpNoteSync = NoteSync<ReqwestTransport, SqliteSessionRepository>;

#[derive(Debug)]
pub enum OpenError {
    Config(ConfigError),
    Db(DbError),
    Session(SessionError),
    Transport(String),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "failed to open client storage: {err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Transport(message) => write!(f, "{message}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Transport(_) => None,
        }
    }
}

impl From<ConfigError> for OpenError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for OpenError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SessionError> for OpenError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<RepoError> for OpenError {
    fn from(value: RepoError) -> Self {
        Self::Session(SessionError::Repo(value))
    }
}

/// Opens storage, resumes any persisted session and builds the sync stack.
pub fn open_client(config: &ClientConfig) -> Result<HttpNoteSync, OpenError> {
    let storage_path = config.storage_path();
    let conn = open_db(&storage_path)?;
    let repo = SqliteSessionRepository::try_new(conn)?;
    let session = SessionStore::open(repo)?;
    let transport = ReqwestTransport::new(&config.api.base_url, config.request_timeout())
        .map_err(|err| OpenError::Transport(err.to_string()))?;

    info!(
        "event=client_open module=app status=ok base_url={} storage={}",
        transport.base_url(),
        storage_path.display()
    );
    Ok(NoteSync::new(AuthGateway::new(transport, session)))
}
