//! Chat relay: the transcript model, the HTTP client for the backend and the
//! single-flight send cycle that ties them to the identity session.

mod client;
mod error;
mod message;
mod session;

pub use client::ChatClient;
pub use error::{ChatError, ChatErrorKind};
pub use message::{Message, Role, Transcript};
pub use session::{ChatSession, SendOutcome, SendPhase, run_turn};
