//! Authenticated request gateway.
//!
//! # Responsibility
//! - Attach `Authorization: Bearer <token>` from the session store to every
//!   authenticated call.
//! - Classify responses: 401 means the session is invalid, anything else
//!   non-2xx (or a transport failure) means the operation failed.
//!
//! # Invariants
//! - On a 401 from an authenticated call, `SessionStore::logout` has run
//!   before control returns to the caller.
//! - Public calls (`register`, `authenticate`) never touch the session.
//! - Tokens and passwords never appear in log lines.

use super::wire::{AuthPayload, LoginResponse, RegisterResponse, WelcomeResponse};
use super::{ApiRequest, ApiResponse, HttpTransport};
use crate::error::{ClientError, ClientResult};
use crate::model::note::{Note, NoteId, NoteInput};
use crate::model::session::Credentials;
use crate::repo::session_repo::SessionRepository;
use crate::service::session_store::SessionStore;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use std::time::Instant;
use uuid::Uuid;

const HTTP_UNAUTHORIZED: u16 = 401;

/// Gateway between callers and the notes API. Owns the session store.
pub struct AuthGateway<T: HttpTransport, R: SessionRepository> {
    transport: T,
    session: SessionStore<R>,
}

impl<T: HttpTransport, R: SessionRepository> AuthGateway<T, R> {
    pub fn new(transport: T, session: SessionStore<R>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore<R> {
        &mut self.session
    }


    /// `POST /auth/register`; returns the new user id.
    pub fn register(&self, email: &str, password: &str) -> ClientResult<String> {
        let request = ApiRequest::post("/auth/register")
            .with_json(&AuthPayload { email, password })
            .map_err(|err| ClientError::failed(None, err.message()))?;
        let response = self.send_public(&request)?;
        let body: RegisterResponse = decode(&response, &request)?;
        Ok(body.user_id)
    }

    /// `POST /auth/login`; returns the issued credentials without storing them.
    ///
    /// A 401 here means wrong email or password and is reported as
    /// `ClientError::Failed` with the server's detail.
    pub fn authenticate(&self, email: &str, password: &str) -> ClientResult<Credentials> {
        let request = ApiRequest::post("/auth/login")
            .with_json(&AuthPayload { email, password })
            .map_err(|err| ClientError::failed(None, err.message()))?;
        let response = self.send_public(&request)?;
        let body: LoginResponse = decode(&response, &request)?;
        Ok(Credentials::new(body.access_token, body.user_id))
    }

    /// `GET /` reachability probe; returns the server's welcome message.
    pub fn ping(&self) -> ClientResult<String> {
        let request = ApiRequest::get("/");
        let response = self.send_public(&request)?;
        let body: WelcomeResponse = decode(&response, &request)?;
        Ok(body.message)
    }

    /// `GET /notes`
    pub fn list_notes(&mut self) -> ClientResult<Vec<Note>> {
        let request = ApiRequest::get("/notes");
        let response = self.send_authenticated(request.clone())?;
        decode(&response, &request)
    }

    /// `GET /notes/{id}`
    pub fn get_note(&mut self, id: &NoteId) -> ClientResult<Note> {
        let request = ApiRequest::get(note_path(id));
        let response = self.send_authenticated(request.clone())?;
        decode(&response, &request)
    }

    /// `POST /notes`
    pub fn create_note(&mut self, input: &NoteInput) -> ClientResult<Note> {
        let request = ApiRequest::post("/notes")
            .with_json(input)
            .map_err(|err| ClientError::failed(None, err.message()))?;
        let response = self.send_authenticated(request.clone())?;
        decode(&response, &request)
    }

    /// `PUT /notes/{id}`
    pub fn update_note(&mut self, id: &NoteId, input: &NoteInput) -> ClientResult<Note> {
        let request = ApiRequest::put(note_path(id))
            .with_json(input)
            .map_err(|err| ClientError::failed(None, err.message()))?;
        let response = self.send_authenticated(request.clone())?;
        decode(&response, &request)
    }

    /// `DELETE /notes/{id}`; expects 204.
    pub fn delete_note(&mut self, id: &NoteId) -> ClientResult<()> {
        self.send_authenticated(ApiRequest::delete(note_path(id)))?;
        Ok(())
    }

    /// Sends a call that requires the current credential.
    ///
    /// Without a session the call is not sent and `AuthInvalid` is returned.
    pub fn send_authenticated(&mut self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let Some(header) = self.session.credentials().map(Credentials::bearer_header) else {
            warn!(
                "event=api_call module=gateway status=error method={} path={} error_code=no_session",
                request.method, request.path
            );
            return Err(ClientError::AuthInvalid);
        };
        let request = request.with_header("Authorization", header);
        let response = self.exchange(&request)?;

        if response.status == HTTP_UNAUTHORIZED {
            warn!(
                "event=session_invalid module=gateway status=error method={} path={}",
                request.method, request.path
            );
            if let Err(err) = self.session.logout() {
                error!(
                    "event=session_invalid module=gateway status=error error_code=forced_logout_failed error={}",
                    err
                );
            }
            return Err(ClientError::AuthInvalid);
        }
        classify(response)
    }

    fn send_public(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let response = self.exchange(request)?;
        classify(response)
    }

    fn exchange(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        match self.transport.send(request) {
            Ok(response) => {
                info!(
                    "event=api_call module=gateway status=ok request_id={} method={} path={} http_status={} duration_ms={}",
                    request_id,
                    request.method,
                    request.path,
                    response.status,
                    started_at.elapsed().as_millis()
                );
                Ok(response)
            }
            Err(err) => {
                error!(
                    "event=api_call module=gateway status=error request_id={} method={} path={} duration_ms={} error_code=transport_failed error={}",
                    request_id,
                    request.method,
                    request.path,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(ClientError::failed(None, err.message()))
            }
        }
    }
}

fn note_path(id: &NoteId) -> String {
    format!("/notes/{id}")
}

fn classify(response: ApiResponse) -> ClientResult<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let message = response
        .detail()
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    Err(ClientError::failed(Some(response.status), message))
}

fn decode<B: DeserializeOwned>(response: &ApiResponse, request: &ApiRequest) -> ClientResult<B> {
    response.json().map_err(|err| {
        error!(
            "event=api_decode module=gateway status=error method={} path={} error={}",
            request.method, request.path, err
        );
        ClientError::UnreadableBody {
            status: response.status,
            message: err.to_string(),
        }
    })
}
