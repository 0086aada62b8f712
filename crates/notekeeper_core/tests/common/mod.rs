//! In-memory fake of the notes API plus sync-stack builders.
#![allow(dead_code)]

use notekeeper_core::db::{open_db, open_db_in_memory};
use notekeeper_core::{
    ApiRequest, ApiResponse, AuthGateway, HttpTransport, Method, NoteSync, SessionStore,
    SqliteSessionRepository, TransportError,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type FakeSync = NoteSync<FakeNotesApi, SqliteSessionRepository>;

#[derive(Debug, Clone)]
struct FakeUser {
    email: String,
    password: String,
    user_id: String,
    token: String,
}

#[derive(Debug, Clone)]
struct FakeNote {
    id: String,
    owner: String,
    title: String,
    content: String,
    updated_at: String,
}

impl FakeNote {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.owner,
            "title": self.title,
            "content": self.content,
            "created_at": self.updated_at,
            "updated_at": self.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(u16, String),
    TransportDown,
}

#[derive(Debug, Default)]
struct FakeState {
    users: Vec<FakeUser>,
    revoked: Vec<String>,
    notes: Vec<FakeNote>,
    next_id: u64,
    clock: u32,
    requests: Vec<ApiRequest>,
    scripted: VecDeque<(Method, String, Scripted)>,
}

impl FakeState {
    fn tick(&mut self) -> String {
        self.clock += 1;
        format!("2024-01-01T00:{:02}:{:02}.000000", self.clock / 60, self.clock % 60)
    }

    fn user_for(&self, request: &ApiRequest) -> Option<String> {
        let token = request.header("Authorization")?.strip_prefix("Bearer ")?;
        if self.revoked.iter().any(|revoked| revoked == token) {
            return None;
        }
        self.users
            .iter()
            .find(|user| user.token == token)
            .map(|user| user.user_id.clone())
    }
}

/// Shared-state fake; clones observe the same server.
#[derive(Debug, Clone, Default)]
pub struct FakeNotesApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeNotesApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str, password: &str, user_id: &str, token: &str) {
        self.state.lock().unwrap().users.push(FakeUser {
            email: email.to_string(),
            password: password.to_string(),
            user_id: user_id.to_string(),
            token: token.to_string(),
        });
    }

    /// Inserts a note directly, as another client would.
    pub fn seed_note(&self, owner: &str, title: &str, content: &str) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("n{}", state.next_id);
        let updated_at = state.tick();
        state.notes.push(FakeNote {
            id: id.clone(),
            owner: owner.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            updated_at,
        });
        id
    }

    /// Makes every later call with `token` answer 401.
    pub fn revoke_token(&self, token: &str) {
        self.state.lock().unwrap().revoked.push(token.to_string());
    }

    /// Next `method path` call answers `status` with `body` instead of the real route.
    pub fn reply_next(&self, method: Method, path: &str, status: u16, body: &str) {
        self.state.lock().unwrap().scripted.push_back((
            method,
            path.to_string(),
            Scripted::Reply(status, body.to_string()),
        ));
    }

    /// Next `method path` call fails before any response.
    pub fn drop_next(&self, method: Method, path: &str) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .push_back((method, path.to_string(), Scripted::TransportDown));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub fn last_request(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .rev()
            .find(|request| request.method == method && request.path == path)
            .cloned()
    }

    pub fn note_titles(&self, owner: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .notes
            .iter()
            .filter(|note| note.owner == owner)
            .map(|note| note.title.clone())
            .collect()
    }

    fn route(state: &mut FakeState, request: &ApiRequest) -> ApiResponse {
        let body = request.body.clone().unwrap_or(Value::Null);
        let field = |name: &str| body.get(name).and_then(Value::as_str).unwrap_or("").to_string();

        match (request.method, request.path.as_str()) {
            (Method::Get, "/") => reply(200, json!({"message": "Welcome to the Full-Stack Notes App API"})),
            (Method::Post, "/auth/register") => {
                let email = field("email");
                if state.users.iter().any(|user| user.email == email) {
                    return reply(400, json!({"detail": "User with this email already exists"}));
                }
                state.next_id += 1;
                let user_id = format!("u{}", state.next_id);
                state.users.push(FakeUser {
                    email,
                    password: field("password"),
                    user_id: user_id.clone(),
                    token: format!("tok-{user_id}"),
                });
                reply(200, json!({"message": "User registered successfully", "user_id": user_id}))
            }
            (Method::Post, "/auth/login") => {
                let (email, password) = (field("email"), field("password"));
                match state
                    .users
                    .iter()
                    .find(|user| user.email == email && user.password == password)
                {
                    Some(user) => reply(
                        200,
                        json!({"access_token": user.token, "token_type": "bearer", "user_id": user.user_id}),
                    ),
                    None => reply(401, json!({"detail": "Incorrect email or password"})),
                }
            }
            (method, path) if path == "/notes" || path.starts_with("/notes/") => {
                let Some(owner) = state.user_for(request) else {
                    return reply(401, json!({"detail": "Invalid token"}));
                };
                let note_id = path.strip_prefix("/notes/").map(str::to_string);
                Self::notes_route(state, method, note_id, owner, field("title"), field("content"))
            }
            _ => reply(404, json!({"detail": "Not Found"})),
        }
    }

    fn notes_route(
        state: &mut FakeState,
        method: Method,
        note_id: Option<String>,
        owner: String,
        title: String,
        content: String,
    ) -> ApiResponse {
        let not_found = || reply(404, json!({"detail": "Note not found or you don't own it"}));
        let position = note_id.as_ref().and_then(|id| {
            state
                .notes
                .iter()
                .position(|note| &note.id == id && note.owner == owner)
        });

        match (method, note_id.is_some()) {
            (Method::Get, false) => {
                let items: Vec<Value> = state
                    .notes
                    .iter()
                    .filter(|note| note.owner == owner)
                    .map(FakeNote::to_json)
                    .collect();
                reply(200, Value::Array(items))
            }
            (Method::Post, false) => {
                state.next_id += 1;
                let note = FakeNote {
                    id: format!("n{}", state.next_id),
                    owner,
                    title,
                    content,
                    updated_at: state.tick(),
                };
                let body = note.to_json();
                state.notes.push(note);
                reply(201, body)
            }
            (Method::Get, true) => match position {
                Some(index) => reply(200, state.notes[index].to_json()),
                None => not_found(),
            },
            (Method::Put, true) => match position {
                Some(index) => {
                    let updated_at = state.tick();
                    let note = &mut state.notes[index];
                    note.title = title;
                    note.content = content;
                    note.updated_at = updated_at;
                    reply(200, note.to_json())
                }
                None => not_found(),
            },
            (Method::Delete, true) => match position {
                Some(index) => {
                    state.notes.remove(index);
                    ApiResponse::new(204, "")
                }
                None => not_found(),
            },
            _ => reply(405, json!({"detail": "Method Not Allowed"})),
        }
    }
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

impl HttpTransport for FakeNotesApi {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let scripted = state
            .scripted
            .iter()
            .position(|(method, path, _)| *method == request.method && path == &request.path)
            .and_then(|index| state.scripted.remove(index));
        match scripted {
            Some((_, _, Scripted::Reply(status, body))) => Ok(ApiResponse::new(status, body)),
            Some((_, _, Scripted::TransportDown)) => {
                Err(TransportError::new("connection refused"))
            }
            None => Ok(Self::route(&mut state, request)),
        }
    }
}

pub fn sync_in_memory(api: &FakeNotesApi) -> FakeSync {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSessionRepository::try_new(conn).unwrap();
    let session = SessionStore::open(repo).unwrap();
    NoteSync::new(AuthGateway::new(api.clone(), session))
}

pub fn sync_at(api: &FakeNotesApi, path: &Path) -> FakeSync {
    let conn = open_db(path).unwrap();
    let repo = SqliteSessionRepository::try_new(conn).unwrap();
    let session = SessionStore::open(repo).unwrap();
    NoteSync::new(AuthGateway::new(api.clone(), session))
}

/// Sync stack already logged in as `u1` with token `tok1`.
pub fn logged_in(api: &FakeNotesApi) -> FakeSync {
    api.add_user("a@b.com", "x", "u1", "tok1");
    let mut sync = sync_in_memory(api);
    sync.session_mut().login("tok1", "u1").unwrap();
    sync
}
