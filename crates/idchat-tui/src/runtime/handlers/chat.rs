use idchat_core::chat::{ChatClient, run_turn};
use idchat_core::identity::SessionManager;
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;

/// Acquires a token and posts one prompt; yields exactly one outcome.
///
/// Cancelling drops the turn, including any interactive sign-in the token
/// acquisition fell back to, so its loopback port is released.
pub async fn send_prompt(
    sessions: SessionManager,
    client: ChatClient,
    prompt: String,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let cancel = cancel.unwrap_or_default();
    tokio::select! {
        biased;
        () = cancel.cancelled() => UiEvent::ChatCancelled,
        outcome = run_turn(&sessions, &client, &prompt) => UiEvent::ChatCompleted(outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::handlers::testing::signed_out_sessions;

    #[tokio::test]
    async fn test_cancelled_send_yields_no_outcome() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let event = send_prompt(
            signed_out_sessions(),
            ChatClient::new("http://127.0.0.1:9/api/chat"),
            "hello".to_string(),
            Some(cancel),
        )
        .await;
        assert!(matches!(event, UiEvent::ChatCancelled));
    }

    #[tokio::test]
    async fn test_send_without_account_fails_authentication() {
        let event = send_prompt(
            signed_out_sessions(),
            ChatClient::new("http://127.0.0.1:9/api/chat"),
            "hello".to_string(),
            None,
        )
        .await;
        let UiEvent::ChatCompleted(idchat_core::chat::SendOutcome::Failed(err)) = event else {
            panic!("expected a failed outcome, got {event:?}");
        };
        assert_eq!(err.kind, idchat_core::chat::ChatErrorKind::Authentication);
    }
}
