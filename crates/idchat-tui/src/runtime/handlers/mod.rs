//! Effect handlers for the TUI runtime.
//!
//! Handlers are async functions that perform I/O and return a `UiEvent`.
//! They never touch `AppState`; the runtime spawns them and routes the
//! returned event through the inbox.

pub mod auth;
pub mod chat;

pub use auth::*;
pub use chat::*;
