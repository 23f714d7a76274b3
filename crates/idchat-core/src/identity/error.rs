use thiserror::Error;

/// Failures from the identity layer.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Only an interactive sign-in can produce a token.
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    #[error("no signed-in account")]
    NoAccount,

    #[error("sign-in was cancelled")]
    Cancelled,

    #[error("identity provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("identity protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl IdentityError {
    pub fn is_interaction_required(&self) -> bool {
        matches!(self, Self::InteractionRequired(_))
    }
}
