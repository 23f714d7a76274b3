//! Sign-in, sign-out and status commands.

use anyhow::{Context, Result};
use idchat_core::identity::SessionManager;

const NOT_SIGNED_IN: &str = "Not signed in.";

pub async fn login(sessions: &SessionManager) -> Result<()> {
    println!("Opening your browser to sign in...");
    let account = sessions.login().await.context("sign in")?;
    println!("Signed in as {}", account.display_name());
    Ok(())
}

pub async fn logout(sessions: &SessionManager) -> Result<()> {
    if sessions.initialize().is_none() {
        println!("{NOT_SIGNED_IN}");
        return Ok(());
    }
    sessions.sign_out().await;
    println!("Signed out.");
    Ok(())
}

pub fn status(sessions: &SessionManager) {
    match sessions.initialize() {
        Some(account) => println!(
            "Signed in as {} ({})",
            account.display_name(),
            account.username
        ),
        None => println!("{NOT_SIGNED_IN}"),
    }
}
