//! Repository layer over durable client storage.
//!
//! # Responsibility
//! - Define the persistence contract the session store depends on.
//! - Isolate SQLite query details from session orchestration.

pub mod session_repo;
