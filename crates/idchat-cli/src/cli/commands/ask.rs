//! Non-interactive send: one prompt in, one reply out.

use anyhow::Result;
use idchat_core::chat::{ChatClient, ChatSession, Role};
use idchat_core::identity::SessionManager;

pub async fn run(sessions: &SessionManager, client: &ChatClient, prompt: &str) -> Result<()> {
    sessions.initialize();

    let mut session = ChatSession::new();
    session.set_input(prompt);
    if !session.send(sessions, client).await {
        anyhow::bail!("Prompt must not be empty");
    }

    if let Some(err) = session.error {
        anyhow::bail!("{} error: {}", err.kind, err.message);
    }
    if let Some(reply) = session
        .transcript
        .last()
        .filter(|message| message.role() == Role::Assistant)
    {
        println!("{}", reply.content());
    }
    Ok(())
}
