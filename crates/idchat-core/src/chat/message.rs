use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only, in-memory conversation log.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_get_unique_ids() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.role(), Role::User);
        assert!(a.created_at() <= b.created_at());
    }

    #[test]
    fn test_transcript_preserves_order() {
        let mut transcript = Transcript::default();
        assert!(transcript.is_empty());

        transcript.push(Message::user("question"));
        transcript.push(Message::assistant("answer"));

        let contents: Vec<_> = transcript.iter().map(Message::content).collect();
        assert_eq!(contents, vec!["question", "answer"]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().role(), Role::Assistant);
    }
}
