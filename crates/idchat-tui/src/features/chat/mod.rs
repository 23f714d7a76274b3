//! Chat feature slice (state/update/render).

mod render;
mod state;
mod update;

pub use render::{render_chat, transcript_lines};
pub use state::ChatState;
pub use update::{ChatAction, handle_chat_completed, handle_key, handle_paste};
