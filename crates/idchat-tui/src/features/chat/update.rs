//! Chat feature reducer.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use idchat_core::chat::SendOutcome;

use super::ChatState;

/// Lines moved per PgUp/PgDn.
const SCROLL_PAGE: usize = 10;

/// What the top-level reducer must do after a chat key.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatAction {
    None,
    Send(String),
    SignOut,
    Quit,
}

pub fn handle_key(chat: &mut ChatState, key: KeyEvent) -> ChatAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => ChatAction::Quit,
        KeyCode::Char('l') if ctrl => ChatAction::SignOut,
        KeyCode::Char(_) if ctrl => ChatAction::None,
        KeyCode::Char(c) => {
            chat.session.push_char(c);
            ChatAction::None
        }
        KeyCode::Backspace => {
            chat.session.backspace();
            ChatAction::None
        }
        KeyCode::Enter => submit(chat),
        KeyCode::PageUp => {
            chat.scroll_offset = chat.scroll_offset.saturating_add(SCROLL_PAGE);
            ChatAction::None
        }
        KeyCode::PageDown => {
            chat.scroll_offset = chat.scroll_offset.saturating_sub(SCROLL_PAGE);
            ChatAction::None
        }
        KeyCode::End => {
            chat.scroll_offset = 0;
            ChatAction::None
        }
        _ => ChatAction::None,
    }
}

/// Pasted text goes into the draft with newlines flattened.
pub fn handle_paste(chat: &mut ChatState, text: &str) {
    for c in text.chars() {
        chat.session.push_char(if c == '\n' || c == '\r' { ' ' } else { c });
    }
}

fn submit(chat: &mut ChatState) -> ChatAction {
    match chat.session.begin_send() {
        Some(prompt) => {
            chat.input_focused = false;
            chat.scroll_offset = 0;
            ChatAction::Send(prompt)
        }
        None => ChatAction::None,
    }
}

pub fn handle_chat_completed(chat: &mut ChatState, outcome: SendOutcome) {
    chat.session.finish_send(outcome);
    chat.input_focused = true;
}

#[cfg(test)]
mod tests {
    use idchat_core::chat::{ChatError, ChatErrorKind, Role};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(chat: &mut ChatState, text: &str) {
        for c in text.chars() {
            handle_key(chat, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_enter_sends_trimmed_prompt() {
        let mut chat = ChatState::default();
        type_text(&mut chat, " hi ");

        assert_eq!(
            handle_key(&mut chat, key(KeyCode::Enter)),
            ChatAction::Send("hi".to_string())
        );
        assert!(!chat.input_focused);
        assert_eq!(chat.session.transcript.len(), 1);
    }

    #[test]
    fn test_enter_ignored_when_blank_or_sending() {
        let mut chat = ChatState::default();
        type_text(&mut chat, "   ");
        assert_eq!(handle_key(&mut chat, key(KeyCode::Enter)), ChatAction::None);
        assert!(chat.session.transcript.is_empty());

        chat.session.set_input("one");
        handle_key(&mut chat, key(KeyCode::Enter));
        chat.session.input = "two".to_string();
        assert_eq!(handle_key(&mut chat, key(KeyCode::Enter)), ChatAction::None);
        assert_eq!(chat.session.transcript.len(), 1);
    }

    #[test]
    fn test_completion_restores_focus() {
        let mut chat = ChatState::default();
        type_text(&mut chat, "hi");
        handle_key(&mut chat, key(KeyCode::Enter));

        handle_chat_completed(&mut chat, SendOutcome::Reply("hello".to_string()));
        assert!(chat.input_focused);
        assert!(!chat.session.sending);
        assert_eq!(chat.session.transcript.last().unwrap().role(), Role::Assistant);

        handle_key(&mut chat, key(KeyCode::Enter));
        type_text(&mut chat, "again");
        handle_key(&mut chat, key(KeyCode::Enter));
        handle_chat_completed(
            &mut chat,
            SendOutcome::Failed(ChatError::from_status(401)),
        );
        assert!(chat.input_focused);
        assert_eq!(
            chat.session.error.as_ref().unwrap().kind,
            ChatErrorKind::Authentication
        );
    }

    #[test]
    fn test_control_keys() {
        let mut chat = ChatState::default();
        assert_eq!(handle_key(&mut chat, ctrl('c')), ChatAction::Quit);
        assert_eq!(handle_key(&mut chat, ctrl('l')), ChatAction::SignOut);
        assert_eq!(handle_key(&mut chat, ctrl('x')), ChatAction::None);
        assert!(chat.session.input.is_empty());
    }

    #[test]
    fn test_scroll_and_follow() {
        let mut chat = ChatState::default();
        handle_key(&mut chat, key(KeyCode::PageUp));
        assert!(!chat.is_following());
        handle_key(&mut chat, key(KeyCode::PageDown));
        assert!(chat.is_following());
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut chat = ChatState::default();
        handle_paste(&mut chat, "a\nb");
        assert_eq!(chat.session.input, "a b");
    }
}
