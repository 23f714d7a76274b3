//! Feature slices for the TUI (state/update/render per slice).

pub mod auth;
pub mod chat;
pub mod login;
