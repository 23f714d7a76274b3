use std::fmt;

use thiserror::Error;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const ACCESS_DENIED: &str = "You do not have permission to access this resource.";
pub const SERVER_ERROR: &str = "The server encountered an error. Please try again later.";
pub const NETWORK_ERROR: &str = "Unable to reach the server. Check your connection and try again.";
pub const AUTHENTICATION_FAILED: &str = "Authentication failed. Please sign in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    Authentication,
    Server,
    Network,
}

impl fmt::Display for ChatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Authentication => "authentication",
            Self::Server => "server",
            Self::Network => "network",
        })
    }
}

/// A failed send, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// No token could be obtained for the request.
    pub fn authentication_failed() -> Self {
        Self::new(ChatErrorKind::Authentication, AUTHENTICATION_FAILED)
    }

    pub fn network() -> Self {
        Self::new(ChatErrorKind::Network, NETWORK_ERROR)
    }

    /// Maps a non-2xx status from the chat backend.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::new(ChatErrorKind::Authentication, SESSION_EXPIRED),
            403 => Self::new(ChatErrorKind::Authentication, ACCESS_DENIED),
            500 => Self::new(ChatErrorKind::Server, SERVER_ERROR),
            other => Self::new(
                ChatErrorKind::Server,
                format!("Request failed with status {other}"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unauthorized = ChatError::from_status(401);
        assert_eq!(unauthorized.kind, ChatErrorKind::Authentication);
        assert_eq!(unauthorized.message, SESSION_EXPIRED);

        let forbidden = ChatError::from_status(403);
        assert_eq!(forbidden.kind, ChatErrorKind::Authentication);
        assert_eq!(forbidden.message, ACCESS_DENIED);

        let internal = ChatError::from_status(500);
        assert_eq!(internal.kind, ChatErrorKind::Server);
        assert_eq!(internal.message, SERVER_ERROR);

        let teapot = ChatError::from_status(418);
        assert_eq!(teapot.kind, ChatErrorKind::Server);
        assert!(teapot.message.contains("418"));
    }

    #[test]
    fn test_display_is_the_message() {
        assert_eq!(ChatError::network().to_string(), NETWORK_ERROR);
        assert_eq!(ChatErrorKind::Authentication.to_string(), "authentication");
    }
}
