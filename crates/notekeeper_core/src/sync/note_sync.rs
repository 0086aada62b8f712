//! Note collection sync: full refetch after every mutation.
//!
//! # Responsibility
//! - Hold the client's only copy of the note list.
//! - Replace that copy wholesale from `GET /notes`; never patch it locally.
//! - Re-fetch after every successful create/update/delete.
//!
//! # Invariants
//! - The list is a complete server snapshot as of the last successful refresh.
//! - A failed mutation or refresh leaves the list untouched.
//! - The list only holds notes fetched under the current credential; a
//!   credential change empties it before the first fetch.
//! - A 2xx mutation counts as done even if its body is unreadable.
//! - A 401 anywhere leaves the list untouched; the gateway has already
//!   cleared the session.
//! - Calls take `&mut self`, so one instance never has two refreshes in
//!   flight; a newer refresh always completes after an older one.

use crate::api::{AuthGateway, HttpTransport};
use crate::error::{ClientError, ClientResult};
use crate::model::note::{Note, NoteId, NoteInput};
use crate::repo::session_repo::SessionRepository;
use crate::service::session_store::SessionStore;
use log::{info, warn};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch notes.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save the note.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete note.";

/// Lifecycle of the note list resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading,
    Error(String),
}

/// Owns the gateway (and through it the session) plus the synced note list.
pub struct NoteSync<T: HttpTransport, R: SessionRepository> {
    gateway: AuthGateway<T, R>,
    notes: Vec<Note>,
    state: SyncState,
    synced_token: Option<String>,
    refresh_count: u64,
}

impl<T: HttpTransport, R: SessionRepository> NoteSync<T, R> {
    pub fn new(gateway: AuthGateway<T, R>) -> Self {
        Self {
            gateway,
            notes: Vec::new(),
            state: SyncState::Idle,
            synced_token: None,
            refresh_count: 0,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    /// Completed refresh attempts, successful or not.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn gateway(&self) -> &AuthGateway<T, R> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut AuthGateway<T, R> {
        &mut self.gateway
    }

    pub fn session(&self) -> &SessionStore<R> {
        self.gateway.session()
    }

    pub fn session_mut(&mut self) -> &mut SessionStore<R> {
        self.gateway.session_mut()
    }

    /// Re-syncs after the credential may have changed.
    ///
    /// A new token empties the list and triggers a refresh; no token empties
    /// the list. An unchanged token is a no-op.
    pub fn on_session_changed(&mut self) -> ClientResult<()> {
        let current = self.gateway.session().token().map(str::to_string);
        if current == self.synced_token {
            return Ok(());
        }
        self.reset(if current.is_some() {
            "session_switched"
        } else {
            "logged_out"
        });
        match current {
            Some(_) => self.refresh(),
            None => Ok(()),
        }
    }

    /// Drops every note fetched under the previous credential.
    fn reset(&mut self, reason: &str) {
        info!(
            "event=notes_reset module=sync status=ok reason={} dropped={}",
            reason,
            self.notes.len()
        );
        self.notes.clear();
        self.state = SyncState::Idle;
        self.synced_token = None;
    }

    /// Replaces the whole list with the server's current list.
    pub fn refresh(&mut self) -> ClientResult<()> {
        self.state = SyncState::Loading;
        let token = self.gateway.session().token().map(str::to_string);
        let result = self.gateway.list_notes();
        self.refresh_count += 1;

        match result {
            Ok(notes) => {
                info!(
                    "event=notes_refresh module=sync status=ok count={} seq={}",
                    notes.len(),
                    self.refresh_count
                );
                self.notes = notes;
                self.state = SyncState::Idle;
                self.synced_token = token;
                Ok(())
            }
            Err(ClientError::AuthInvalid) => {
                warn!(
                    "event=notes_refresh module=sync status=error error_code=session_invalid seq={}",
                    self.refresh_count
                );
                self.state = SyncState::Idle;
                Err(ClientError::AuthInvalid)
            }
            Err(err) => {
                warn!(
                    "event=notes_refresh module=sync status=error seq={} error={}",
                    self.refresh_count, err
                );
                self.state = SyncState::Error(FETCH_FAILED_MESSAGE.to_string());
                Err(relabel(err, FETCH_FAILED_MESSAGE))
            }
        }
    }

    /// Creates a note, then refreshes.
    ///
    /// Returns the server's copy of the note, or `None` when the server
    /// accepted the write but its body could not be read.
    pub fn create(&mut self, input: &NoteInput) -> ClientResult<Option<Note>> {
        let created = written("create", self.gateway.create_note(input))?;
        info!(
            "event=note_create module=sync status=ok note_id={}",
            created
                .as_ref()
                .map_or("unknown", |note| note.id.as_str())
        );
        self.refresh_after_mutation()?;
        Ok(created)
    }

    /// Replaces title and content of one note, then refreshes.
    ///
    /// Returns `None` under the same condition as [`NoteSync::create`].
    pub fn update(&mut self, id: &NoteId, input: &NoteInput) -> ClientResult<Option<Note>> {
        let updated = written("update", self.gateway.update_note(id, input))?;
        info!("event=note_update module=sync status=ok note_id={}", id);
        self.refresh_after_mutation()?;
        Ok(updated)
    }

    /// Deletes one note, then refreshes.
    pub fn delete(&mut self, id: &NoteId) -> ClientResult<()> {
        self.gateway
            .delete_note(id)
            .map_err(|err| mutation_failed("delete", err, DELETE_FAILED_MESSAGE))?;
        info!("event=note_delete module=sync status=ok note_id={}", id);
        self.refresh_after_mutation()
    }

    /// The mutation already succeeded; only a session loss is escalated.
    fn refresh_after_mutation(&mut self) -> ClientResult<()> {
        match self.refresh() {
            Err(ClientError::AuthInvalid) => Err(ClientError::AuthInvalid),
            Ok(()) | Err(_) => Ok(()),
        }
    }
}

/// A 2xx answer means the write happened, readable body or not.
fn written(action: &str, result: ClientResult<Note>) -> ClientResult<Option<Note>> {
    match result {
        Ok(note) => Ok(Some(note)),
        Err(ClientError::UnreadableBody { status, message }) => {
            warn!(
                "event=note_{} module=sync status=ok http_status={} error_code=unreadable_body error={}",
                action, status, message
            );
            Ok(None)
        }
        Err(err) => Err(mutation_failed(action, err, SAVE_FAILED_MESSAGE)),
    }
}

fn mutation_failed(action: &str, err: ClientError, message: &str) -> ClientError {
    warn!(
        "event=note_{} module=sync status=error error={}",
        action, err
    );
    relabel(err, message)
}

fn relabel(err: ClientError, message: &str) -> ClientError {
    match err {
        ClientError::Failed { status, .. } => ClientError::failed(status, message),
        ClientError::UnreadableBody { status, .. } => ClientError::failed(Some(status), message),
        other => other,
    }
}
