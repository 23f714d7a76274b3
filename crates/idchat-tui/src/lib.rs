//! Full-screen TUI for idchat.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod router;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
pub use features::{auth, chat, login};
use idchat_core::chat::ChatClient;
use idchat_core::config::Config;
use idchat_core::identity::SessionManager;
pub use runtime::TuiRuntime;

use crate::state::AppState;

/// Runs the interactive app: restore session, sign in if needed, chat.
pub async fn run_interactive(
    config: &Config,
    sessions: SessionManager,
    client: ChatClient,
) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Interactive mode requires a terminal.\n\
             Use `idchat ask -p '...'` for non-interactive use."
        );
    }

    let state = AppState::new(config.identity.authority_host());
    let mut runtime = TuiRuntime::new(state, sessions, client)?;
    let result = runtime.run();
    drop(runtime);
    result
}
