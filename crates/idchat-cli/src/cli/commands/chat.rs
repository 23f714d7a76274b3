//! Interactive chat command handler.

use anyhow::{Context, Result};
use idchat_core::chat::ChatClient;
use idchat_core::config::Config;
use idchat_core::identity::SessionManager;

pub async fn run(config: &Config, sessions: SessionManager, client: ChatClient) -> Result<()> {
    idchat_tui::run_interactive(config, sessions, client)
        .await
        .context("interactive chat failed")
}
