//! Application state composition.
//!
//! ```text
//! AppState
//! ├── auth: AuthState     (interaction status, signed-in account)
//! ├── chat: ChatState     (send cycle, transcript, scroll)
//! ├── task_seq: TaskSeq   (async task id generator)
//! └── tasks: Tasks        (task lifecycle state)
//! ```

use crate::auth::AuthState;
use crate::chat::ChatState;
use crate::common::{TaskSeq, Tasks};

#[derive(Debug, Default)]
pub struct AppState {
    pub auth: AuthState,
    pub chat: ChatState,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    /// Host shown on the login view.
    pub authority_host: String,
    pub spinner_frame: usize,
    pub viewport: (u16, u16),
    pub should_quit: bool,
}

impl AppState {
    pub fn new(authority_host: impl Into<String>) -> Self {
        Self {
            authority_host: authority_host.into(),
            ..Self::default()
        }
    }
}
