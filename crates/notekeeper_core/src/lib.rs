//! Client core for the notes service.
//! Session handling, authenticated API access and note list sync live here;
//! rendering is left to the front end.

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;
pub mod view;

pub use api::{
    ApiRequest, ApiResponse, AuthGateway, HttpTransport, Method, ReqwestTransport, TransportError,
};
pub use app::{open_client, HttpNoteSync, OpenError};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult, ValidationError};
pub use logging::{default_log_level, init_logging, logging_status, Echo};
pub use model::note::{Note, NoteId, NoteInput};
pub use model::session::Credentials;
pub use repo::session_repo::{
    RepoError, SessionRepository, SqliteSessionRepository, StoredSession,
};
pub use service::session_store::{SessionError, SessionStore};
pub use sync::note_sync::{NoteSync, SyncState};
pub use view::{
    navigation_links, resolve_route, Dashboard, Draft, FormMessage, LoginForm, MessageKind,
    NavLink, RegisterForm, Route, ViewOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
