//! The send-message cycle.
//!
//! ```text
//! Idle -> Composing -> Sending -> Succeeded | Failed -> Idle
//! ```
//!
//! `begin_send` and `finish_send` are synchronous state transitions; the
//! network part (`run_turn`) sits between them so a UI can run it on a task.

use super::{ChatClient, ChatError, Message, Transcript};
use crate::identity::SessionManager;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendPhase {
    #[default]
    Idle,
    Composing,
    Sending,
    Succeeded,
    Failed,
}

/// The single result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Reply(String),
    Failed(ChatError),
}

/// Conversation state for one signed-in session.
#[derive(Debug, Default)]
pub struct ChatSession {
    pub transcript: Transcript,
    pub input: String,
    pub sending: bool,
    pub error: Option<ChatError>,
    phase: SendPhase,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    /// Replaces the draft. Ignored while a send is in flight.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.sending {
            return;
        }
        self.input = text.into();
        self.phase = if self.input.is_empty() {
            SendPhase::Idle
        } else {
            SendPhase::Composing
        };
    }

    pub fn push_char(&mut self, c: char) {
        if self.sending {
            return;
        }
        self.input.push(c);
        self.phase = SendPhase::Composing;
    }

    pub fn backspace(&mut self) {
        if self.sending {
            return;
        }
        self.input.pop();
        if self.input.is_empty() {
            self.phase = SendPhase::Idle;
        }
    }

    /// Guards and starts a send.
    ///
    /// Returns the trimmed prompt to send, or `None` (with no state change)
    /// when the input is blank or a send is already in flight.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.sending {
            return None;
        }
        let prompt = self.input.trim();
        if prompt.is_empty() {
            return None;
        }
        let prompt = prompt.to_string();

        self.error = None;
        self.transcript.push(Message::user(prompt.clone()));
        self.input.clear();
        self.sending = true;
        self.phase = SendPhase::Sending;
        Some(prompt)
    }

    /// Applies the outcome of the in-flight send and returns to `Idle`.
    ///
    /// Returns the terminal phase the attempt went through.
    pub fn finish_send(&mut self, outcome: SendOutcome) -> SendPhase {
        let terminal = match outcome {
            SendOutcome::Reply(reply) => {
                self.transcript.push(Message::assistant(reply));
                SendPhase::Succeeded
            }
            SendOutcome::Failed(err) => {
                self.error = Some(err);
                SendPhase::Failed
            }
        };
        self.sending = false;
        self.phase = SendPhase::Idle;
        terminal
    }

    /// One full cycle: guard, acquire token, post, record. Returns `false`
    /// when the guard rejected the send.
    pub async fn send(&mut self, sessions: &SessionManager, client: &ChatClient) -> bool {
        let Some(prompt) = self.begin_send() else {
            return false;
        };
        let outcome = run_turn(sessions, client, &prompt).await;
        self.finish_send(outcome);
        true
    }
}

/// Acquires a token and posts the prompt. Exactly one outcome per call.
pub async fn run_turn(sessions: &SessionManager, client: &ChatClient, prompt: &str) -> SendOutcome {
    let Some(token) = sessions.acquire_token().await else {
        tracing::warn!("no token available; chat request not sent");
        return SendOutcome::Failed(ChatError::authentication_failed());
    };

    match client.send_prompt(&token, prompt).await {
        Ok(reply) => SendOutcome::Reply(reply),
        Err(err) => SendOutcome::Failed(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::chat::{ChatErrorKind, Role};
    use crate::identity::testing::{FakeProvider, account};
    use crate::identity::{IdentityError, IdentityProvider};

    fn signed_in(token: &str) -> (Arc<FakeProvider>, SessionManager) {
        let provider = Arc::new(FakeProvider::signed_in(account("a", "Ada")));
        provider.push_silent(Ok(token.to_string()));
        let dyn_provider: Arc<dyn IdentityProvider> = Arc::clone(&provider) as Arc<dyn IdentityProvider>;
        (provider, SessionManager::new(dyn_provider, vec![]))
    }

    async fn chat_server(status: u16, body: serde_json::Value, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    fn client_for(server: &MockServer) -> ChatClient {
        ChatClient::new(format!("{}/api/chat", server.uri()))
    }

    #[test]
    fn test_begin_send_appends_user_message_first() {
        let mut session = ChatSession::new();
        session.set_input("  hello  ");
        assert_eq!(session.phase(), SendPhase::Composing);

        let prompt = session.begin_send().unwrap();
        assert_eq!(prompt, "hello");
        assert_eq!(session.transcript.len(), 1);
        let message = session.transcript.last().unwrap();
        assert_eq!(message.role(), Role::User);
        assert_eq!(message.content(), "hello");
        assert!(session.input.is_empty());
        assert!(session.sending);
        assert_eq!(session.phase(), SendPhase::Sending);
    }

    #[test]
    fn test_begin_send_rejects_blank_and_in_flight() {
        let mut session = ChatSession::new();
        session.set_input("   \n\t");
        assert!(session.begin_send().is_none());
        assert!(session.transcript.is_empty());
        assert!(!session.sending);

        session.set_input("first");
        session.begin_send().unwrap();
        session.input = "second".to_string();
        assert!(session.begin_send().is_none());
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.input, "second");
    }

    #[test]
    fn test_begin_send_clears_previous_error() {
        let mut session = ChatSession::new();
        session.set_input("one");
        session.begin_send().unwrap();
        let terminal = session.finish_send(SendOutcome::Failed(ChatError::network()));
        assert_eq!(terminal, SendPhase::Failed);
        assert!(session.error.is_some());
        assert_eq!(session.phase(), SendPhase::Idle);

        session.set_input("two");
        session.begin_send().unwrap();
        assert!(session.error.is_none());
    }

    #[test]
    fn test_editing_is_ignored_while_sending() {
        let mut session = ChatSession::new();
        session.set_input("hi");
        session.begin_send().unwrap();

        session.push_char('x');
        session.backspace();
        session.set_input("typed");
        assert!(session.input.is_empty());
    }

    #[tokio::test]
    async fn test_reply_appends_assistant_and_clears_loading() {
        let server = chat_server(200, json!({ "reply": "hello" }), 1).await;
        let (_, sessions) = signed_in("tok");
        let mut session = ChatSession::new();
        session.set_input("hi");

        assert!(session.send(&sessions, &client_for(&server)).await);

        assert_eq!(session.transcript.len(), 2);
        let reply = session.transcript.last().unwrap();
        assert_eq!(reply.role(), Role::Assistant);
        assert_eq!(reply.content(), "hello");
        assert!(!session.sending);
        assert!(session.error.is_none());
        assert_eq!(session.phase(), SendPhase::Idle);
    }

    #[tokio::test]
    async fn test_blank_input_makes_no_network_call() {
        let server = chat_server(200, json!({ "reply": "x" }), 0).await;
        let (provider, sessions) = signed_in("tok");
        let mut session = ChatSession::new();
        session.set_input("   ");

        assert!(!session.send(&sessions, &client_for(&server)).await);
        assert!(session.transcript.is_empty());
        assert_eq!(provider.silent_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_token_records_auth_error_without_http() {
        let server = chat_server(200, json!({ "reply": "x" }), 0).await;
        let provider = Arc::new(FakeProvider::signed_in(account("a", "Ada")));
        provider.push_silent(Err(IdentityError::Http {
            status: 500,
            body: String::new(),
        }));
        let sessions = SessionManager::new(Arc::clone(&provider) as Arc<dyn IdentityProvider>, vec![]);
        let mut session = ChatSession::new();
        session.set_input("hi");

        session.send(&sessions, &client_for(&server)).await;

        let err = session.error.clone().unwrap();
        assert_eq!(err.kind, ChatErrorKind::Authentication);
        assert_eq!(err.message, "Authentication failed. Please sign in again.");
        assert_eq!(session.transcript.len(), 1);
        assert!(!session.sending);
    }

    #[tokio::test]
    async fn test_server_error_is_recorded_once() {
        let server = chat_server(418, json!({}), 1).await;
        let (_, sessions) = signed_in("tok");
        let mut session = ChatSession::new();
        session.set_input("hi");

        session.send(&sessions, &client_for(&server)).await;

        let err = session.error.clone().unwrap();
        assert_eq!(err.kind, ChatErrorKind::Server);
        assert!(err.message.contains("418"));
        assert_eq!(session.transcript.len(), 1);
    }

    #[tokio::test]
    async fn test_run_turn_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer id-token-7"))
            .and(body_json(json!({ "prompt": "what is up" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "ok" })))
            .expect(1)
            .mount(&server)
            .await;
        let (_, sessions) = signed_in("id-token-7");

        let outcome = run_turn(&sessions, &client_for(&server), "what is up").await;
        assert_eq!(outcome, SendOutcome::Reply("ok".to_string()));
    }
}
