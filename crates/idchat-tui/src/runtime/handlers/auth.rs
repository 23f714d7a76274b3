//! Session handlers: restore, interactive sign-in, sign-out.

use idchat_core::identity::{IdentityError, SessionManager};
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;

const LOGIN_CANCELLED: &str = "Sign-in was cancelled.";

pub async fn restore_session(sessions: SessionManager) -> UiEvent {
    UiEvent::SessionRestored(sessions.initialize())
}

/// Runs the browser sign-in until it finishes or `cancel` fires.
///
/// Cancelling drops the in-flight flow, which closes the loopback listener.
pub async fn login(sessions: SessionManager, cancel: Option<CancellationToken>) -> UiEvent {
    let cancel = cancel.unwrap_or_default();
    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => Err(IdentityError::Cancelled),
        result = sessions.login() => result,
    };
    UiEvent::LoginFinished(result.map_err(|err| login_error_message(&err)))
}

pub async fn sign_out(sessions: SessionManager) -> UiEvent {
    sessions.sign_out().await;
    UiEvent::SignedOut
}

fn login_error_message(err: &IdentityError) -> String {
    match err {
        IdentityError::Cancelled => LOGIN_CANCELLED.to_string(),
        other => format!("Sign-in failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::handlers::testing::signed_out_sessions;

    #[tokio::test]
    async fn test_cancelled_login_reports_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let event = login(signed_out_sessions(), Some(cancel)).await;
        let UiEvent::LoginFinished(Err(message)) = event else {
            panic!("expected a cancelled login, got {event:?}");
        };
        assert_eq!(message, LOGIN_CANCELLED);
    }

    #[test]
    fn test_login_error_message() {
        assert_eq!(
            login_error_message(&IdentityError::Cancelled),
            LOGIN_CANCELLED
        );
        assert!(
            login_error_message(&IdentityError::Protocol("bad state".to_string()))
                .starts_with("Sign-in failed: ")
        );
    }
}
