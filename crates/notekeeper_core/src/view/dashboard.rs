//! Dashboard controller: note list, editor modal and error banner.

use super::{Draft, Route, ViewOutcome};
use crate::api::HttpTransport;
use crate::error::{ClientError, ClientResult};
use crate::model::note::{Note, NoteId};
use crate::repo::session_repo::SessionRepository;
use crate::sync::note_sync::{NoteSync, SyncState};
use log::warn;

pub const EMPTY_LIST_MESSAGE: &str = "You have no notes. Create one above!";

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    draft: Draft,
    editor_open: bool,
    banner: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor_open
    }

    /// Inline error banner, if any.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Heading of the editor.
    pub fn editor_title(&self) -> &'static str {
        if self.draft.is_editing() {
            "Edit Note"
        } else {
            "Create New Note"
        }
    }

    /// Opens the editor with an empty draft.
    pub fn open_editor(&mut self) {
        self.draft.clear();
        self.editor_open = true;
    }

    /// Opens the editor pre-filled from `note`.
    pub fn start_edit(&mut self, note: &Note) {
        self.draft = Draft::for_note(note);
        self.editor_open = true;
    }

    /// Discards the draft and closes the editor.
    pub fn cancel(&mut self) {
        self.draft.clear();
        self.editor_open = false;
    }

    /// Runs when the dashboard is shown: syncs if the credential changed.
    pub fn load<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
    ) -> ViewOutcome {
        if !sync.session().is_authenticated() {
            return ViewOutcome::redirect(Route::Login);
        }
        self.banner = None;
        let result = sync.on_session_changed();
        self.settle(sync, result)
    }

    /// Explicit reload of the list.
    pub fn reload<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
    ) -> ViewOutcome {
        self.banner = None;
        let result = sync.refresh();
        self.settle(sync, result)
    }

    /// Validates the draft and creates or updates the note.
    ///
    /// On success the draft is reset and the editor closes.
    pub fn submit<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
    ) -> ViewOutcome {
        self.banner = None;
        let input = match self.draft.to_input() {
            Ok(input) => input,
            Err(err) => {
                self.banner = Some(err.to_string());
                return ViewOutcome::Stay;
            }
        };

        let result = match self.draft.editing_id.clone() {
            Some(id) => sync.update(&id, &input),
            None => sync.create(&input),
        };
        if result.is_ok() {
            self.draft.clear();
            self.editor_open = false;
        }
        self.settle(sync, result.map(|_| ()))
    }

    pub fn delete<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
        id: &NoteId,
    ) -> ViewOutcome {
        self.banner = None;
        let result = sync.delete(id);
        if result.is_ok() && self.draft.editing_id.as_ref() == Some(id) {
            self.cancel();
        }
        self.settle(sync, result)
    }

    /// Ends the session and leaves the dashboard.
    pub fn logout<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
    ) -> ViewOutcome {
        if let Err(err) = sync.session_mut().logout() {
            warn!("event=logout_click module=view status=error error={}", err);
        }
        if let Err(err) = sync.on_session_changed() {
            warn!("event=logout_click module=view status=error error={}", err);
        }
        self.cancel();
        self.banner = None;
        ViewOutcome::redirect(Route::Login)
    }

    fn settle<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &NoteSync<T, R>,
        result: ClientResult<()>,
    ) -> ViewOutcome {
        match result {
            Ok(()) => {
                if let SyncState::Error(message) = sync.state() {
                    self.banner = Some(message.clone());
                }
                ViewOutcome::Stay
            }
            Err(ClientError::AuthInvalid) => {
                self.cancel();
                ViewOutcome::session_expired()
            }
            Err(err) => {
                self.banner = Some(err.to_string());
                ViewOutcome::Stay
            }
        }
    }
}
