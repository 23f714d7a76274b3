//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only, so the reducer stays pure.
//!
//! Cancellation is decided by the reducer (`CancelTask`) and carried out by
//! the runtime calling `token.cancel()`.

use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// Pick the active account from the cache.
    RestoreSession { task: TaskId },

    /// Interactive sign-in (browser + loopback callback). Cancelable.
    StartLogin { task: TaskId },

    /// Sign the active account out.
    SignOut { task: TaskId },

    /// Acquire a token and post the prompt. Cancelable.
    SendPrompt { task: TaskId, prompt: String },

    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
