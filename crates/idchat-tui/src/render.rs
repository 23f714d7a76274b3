//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state or return effects.

use ratatui::Frame;

use crate::router::ViewState;
use crate::state::AppState;
use crate::{chat, login};

pub const APP_NAME: &str = "idchat";

/// Spinner frames for loading and status animations.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    match ViewState::select(&app.auth) {
        ViewState::Loading => login::render_loading(frame, &app.auth, app.spinner_frame),
        ViewState::LoginRequired => login::render_login(frame, &app.auth, &app.authority_host),
        ViewState::Authenticated { display_name } => {
            chat::render_chat(frame, &app.chat, &display_name, app.spinner_frame);
        }
    }
}
