//! Client-side domain model.
//!
//! # Responsibility
//! - Define the shapes the client holds: server notes, note input and
//!   session credentials.
//!
//! # Invariants
//! - `Note` values are read-through copies of server state, never edited locally.
//! - `NoteInput` can only be built with non-empty title and content.

pub mod note;
pub mod session;
