//! Durable session repository over the `client_storage` key/value table.
//!
//! # Responsibility
//! - Read and write the `token` / `userId` storage keys.
//! - Keep both keys in step: writes and deletes of the pair are transactional.
//!
//! # Invariants
//! - `save_session` never leaves one key written without the other.
//! - `clear_session` removes both keys or neither.

use crate::db::DbError;
use crate::model::session::{Credentials, TOKEN_KEY, USER_ID_KEY};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-layer error for session persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "client storage is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw durable state; either key may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl StoredSession {
    /// Both keys present and non-empty.
    pub fn into_credentials(self) -> Option<Credentials> {
        match (self.token, self.user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() && !user_id.is_empty() => {
                Some(Credentials { token, user_id })
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_id.is_none()
    }
}

/// Persistence contract used by the session store.
pub trait SessionRepository {
    /// Reads whatever session keys are currently stored.
    fn load_session(&self) -> RepoResult<StoredSession>;
    /// Writes both keys in one unit.
    fn save_session(&mut self, credentials: &Credentials) -> RepoResult<()>;
    /// Removes both keys in one unit.
    fn clear_session(&mut self) -> RepoResult<()>;
}

/// SQLite-backed session repository. Owns its connection.
pub struct SqliteSessionRepository {
    conn: Connection,
}

impl SqliteSessionRepository {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        if !table_exists(&conn, "client_storage")? {
            return Err(RepoError::MissingRequiredTable("client_storage"));
        }
        Ok(Self { conn })
    }

    /// Reads a single storage key.
    pub fn get_value(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM client_storage WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl SessionRepository for SqliteSessionRepository {
    fn load_session(&self) -> RepoResult<StoredSession> {
        Ok(StoredSession {
            token: self.get_value(TOKEN_KEY)?,
            user_id: self.get_value(USER_ID_KEY)?,
        })
    }

    fn save_session(&mut self, credentials: &Credentials) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (key, value) in [
            (TOKEN_KEY, credentials.token.as_str()),
            (USER_ID_KEY, credentials.user_id.as_str()),
        ] {
            tx.execute(
                "INSERT INTO client_storage (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_session(&mut self) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM client_storage WHERE key IN (?1, ?2);",
            params![TOKEN_KEY, USER_ID_KEY],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
