//! Picks which view is on screen from the auth slice.
//!
//! `ViewState::select` is a pure projection: it never touches the session
//! and never produces effects, so re-rendering with the same status is a
//! no-op.

use crate::auth::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    LoginRequired,
    Authenticated { display_name: String },
}

impl ViewState {
    pub fn select(auth: &AuthState) -> Self {
        if auth.status.in_progress() {
            return Self::Loading;
        }
        match &auth.account {
            Some(account) => Self::Authenticated {
                display_name: account.display_name().to_string(),
            },
            None => Self::LoginRequired,
        }
    }
}
