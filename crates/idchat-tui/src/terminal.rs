//! Puts the terminal into full-screen mode and back.
//!
//! `leave` runs from the runtime's `Drop` and from the panic hook, so it must
//! be safe to call more than once.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode, alternate screen and bracketed paste (pasted prompts arrive as
/// one `Event::Paste`).
pub fn enter() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste) {
        let _ = disable_raw_mode();
        return Err(err).context("Failed to enter full-screen mode");
    }
    Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")
}

pub fn leave() -> Result<()> {
    // Paste mode is a no-op to disable when it was never enabled.
    let _ = execute!(io::stdout(), DisableBracketedPaste);
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")
}

/// Chains a hook that leaves full-screen mode before the panic message is
/// printed. Install it before `enter`.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = leave();
        previous(info);
    }));
}
