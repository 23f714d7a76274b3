use idchat_core::chat::ChatSession;

/// Chat view state: the core send cycle plus view-only bits.
#[derive(Debug)]
pub struct ChatState {
    pub session: ChatSession,
    /// Lines scrolled up from the bottom. Zero follows the latest message.
    pub scroll_offset: usize,
    pub input_focused: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            session: ChatSession::new(),
            scroll_offset: 0,
            input_focused: true,
        }
    }
}

impl ChatState {
    pub fn is_following(&self) -> bool {
        self.scroll_offset == 0
    }
}
