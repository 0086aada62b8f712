//! Client use-case services.
//!
//! # Responsibility
//! - Own client-side state with a defined lifecycle.
//! - Keep gateway and view layers decoupled from storage details.

pub mod session_store;
