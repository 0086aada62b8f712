//! Login form controller.

use super::{validate_credentials_input, FormMessage, Route, ViewOutcome};
use crate::api::HttpTransport;
use crate::error::ClientError;
use crate::repo::session_repo::SessionRepository;
use crate::sync::note_sync::NoteSync;
use log::warn;

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";
const LOGIN_FAILED_MESSAGE: &str = "Login failed.";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    message: Option<FormMessage>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Authenticates, stores the session, then loads the note list.
    pub fn submit<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &mut NoteSync<T, R>,
    ) -> ViewOutcome {
        self.message = None;
        if let Err(err) = validate_credentials_input(&self.email, &self.password) {
            self.message = Some(FormMessage::error(err.to_string()));
            return ViewOutcome::Stay;
        }

        let email = self.email.trim().to_string();
        let credentials = match sync.gateway().authenticate(&email, &self.password) {
            Ok(credentials) => credentials,
            Err(err) => {
                self.message = Some(FormMessage::error(failure_text(&err)));
                return ViewOutcome::Stay;
            }
        };

        if let Err(err) = sync
            .session_mut()
            .login(credentials.token, credentials.user_id)
        {
            warn!("event=login_submit module=view status=error error={}", err);
            self.message = Some(FormMessage::error(LOGIN_FAILED_MESSAGE));
            return ViewOutcome::Stay;
        }

        self.password.clear();
        self.message = Some(FormMessage::success(LOGIN_SUCCESS_MESSAGE));

        match sync.on_session_changed() {
            Err(ClientError::AuthInvalid) => ViewOutcome::session_expired(),
            // The dashboard shows a failed first fetch through the sync state.
            Ok(()) | Err(_) => ViewOutcome::redirect(Route::Dashboard),
        }
    }
}

fn failure_text(err: &ClientError) -> String {
    match err {
        ClientError::Failed {
            status: Some(_),
            message,
        } => message.clone(),
        ClientError::Validation(inner) => inner.to_string(),
        ClientError::Failed { status: None, .. }
        | ClientError::UnreadableBody { .. }
        | ClientError::AuthInvalid
        | ClientError::Storage(_) => LOGIN_FAILED_MESSAGE.to_string(),
    }
}
