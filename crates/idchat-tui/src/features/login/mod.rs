//! Login view and the loading screen shown while a session interaction runs.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::auth::{AuthState, InteractionStatus};
use crate::render::{APP_NAME, spinner};

#[derive(Debug, PartialEq, Eq)]
pub enum LoginAction {
    None,
    StartLogin,
    CancelLogin,
    Quit,
}

/// Keys on the login and loading screens.
pub fn handle_key(auth: &AuthState, key: KeyEvent) -> LoginAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return LoginAction::Quit;
    }
    match (auth.status, key.code) {
        (InteractionStatus::None, KeyCode::Enter) if auth.account.is_none() => {
            LoginAction::StartLogin
        }
        (InteractionStatus::Login, KeyCode::Esc) => LoginAction::CancelLogin,
        (InteractionStatus::None, KeyCode::Esc | KeyCode::Char('q')) => LoginAction::Quit,
        _ => LoginAction::None,
    }
}

pub fn render_login(frame: &mut Frame, auth: &AuthState, authority_host: &str) {
    let mut lines = vec![
        Line::default(),
        Line::styled(
            APP_NAME,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::from(vec![
            Span::raw("Sign in with "),
            Span::styled(authority_host.to_string(), Style::default().fg(Color::White)),
        ]),
        Line::default(),
        Line::styled(
            "Press Enter to sign in",
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(error) = &auth.login_error {
        lines.push(Line::default());
        lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    }
    lines.push(Line::default());
    lines.push(Line::styled("Esc quit", Style::default().fg(Color::DarkGray)));

    render_centered(frame, lines);
}

pub fn render_loading(frame: &mut Frame, auth: &AuthState, spinner_frame: usize) {
    let (message, hint) = match auth.status {
        InteractionStatus::Startup => ("Restoring session...", None),
        InteractionStatus::Login => (
            "Waiting for sign-in in your browser...",
            Some("Esc cancel"),
        ),
        InteractionStatus::Logout => ("Signing out...", None),
        InteractionStatus::None => ("Loading...", None),
    };

    let mut lines = vec![
        Line::default(),
        Line::styled(
            APP_NAME,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::default(),
        Line::from(vec![
            Span::styled(
                format!("{} ", spinner(spinner_frame)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(message),
        ]),
    ];
    if let Some(hint) = hint {
        lines.push(Line::default());
        lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));
    }

    render_centered(frame, lines);
}

fn render_centered(frame: &mut Frame, lines: Vec<Line<'static>>) {
    let height = lines.len() as u16 + 2;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(frame.area());
    let [_, panel, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(56),
        Constraint::Fill(1),
    ])
    .areas(middle);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        panel,
    );
}
