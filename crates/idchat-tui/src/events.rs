//! UI event types.
//!
//! Every input to the reducer is a `UiEvent`: terminal input, timer ticks
//! and results of async work delivered through the runtime inbox.
//!
//! ## Task Lifecycle Events
//!
//! - The runtime emits `TaskStarted` once a task is spawned
//! - The runtime emits `TaskCompleted` wrapping the handler's result event
//! - The reducer is the only place that mutates `TaskState`, and it drops
//!   completions from tasks that are no longer active

use crossterm::event::Event as CrosstermEvent;
use idchat_core::chat::SendOutcome;
use idchat_core::identity::Account;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick; advances the spinner and triggers a render.
    Tick,

    /// Current terminal size, sent before each batch.
    Frame { width: u16, height: u16 },

    Terminal(CrosstermEvent),

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },

    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Startup restore finished; carries the active account, if any.
    SessionRestored(Option<Account>),

    /// Interactive sign-in finished. The error is user-facing text.
    LoginFinished(Result<Account, String>),

    SignedOut,

    /// The in-flight send produced its one outcome.
    ChatCompleted(SendOutcome),

    /// The send was cancelled by sign-out or quit before it finished.
    ChatCancelled,
}
