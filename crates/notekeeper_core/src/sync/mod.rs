//! Note collection synchronization against the notes API.

pub mod note_sync;
