//! Registration form controller.

use super::{validate_credentials_input, FormMessage, Route, ViewOutcome};
use crate::api::HttpTransport;
use crate::error::ClientError;
use crate::repo::session_repo::SessionRepository;
use crate::sync::note_sync::NoteSync;
use std::time::Duration;

const REGISTER_FAILED_MESSAGE: &str = "Registration failed.";
/// Time the success message stays visible before moving to login.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    message: Option<FormMessage>,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Creates the account; the user logs in separately afterwards.
    pub fn submit<T: HttpTransport, R: SessionRepository>(
        &mut self,
        sync: &NoteSync<T, R>,
    ) -> ViewOutcome {
        self.message = None;
        if let Err(err) = validate_credentials_input(&self.email, &self.password) {
            self.message = Some(FormMessage::error(err.to_string()));
            return ViewOutcome::Stay;
        }

        match sync
            .gateway()
            .register(self.email.trim(), &self.password)
        {
            Ok(user_id) => {
                self.password.clear();
                self.message = Some(FormMessage::success(format!(
                    "Registration successful! User ID: {user_id}"
                )));
                ViewOutcome::Redirect {
                    route: Route::Login,
                    notice: None,
                    delay: Some(REDIRECT_DELAY),
                }
            }
            Err(ClientError::Failed {
                status: Some(_),
                message,
            }) => {
                self.message = Some(FormMessage::error(message));
                ViewOutcome::Stay
            }
            Err(_) => {
                self.message = Some(FormMessage::error(REGISTER_FAILED_MESSAGE));
                ViewOutcome::Stay
            }
        }
    }
}
