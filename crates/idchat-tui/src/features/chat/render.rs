//! Chat view.

use chrono::Local;
use idchat_core::chat::{ChatError, ChatErrorKind, Message, Role};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::ChatState;
use crate::common::text::{sanitize_for_display, truncate_with_ellipsis, wrap_text};
use crate::render::{APP_NAME, spinner};

const INPUT_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const HEADER_HEIGHT: u16 = 1;
const TRANSCRIPT_MARGIN: u16 = 1;

pub fn render_chat(
    frame: &mut Frame,
    chat: &ChatState,
    display_name: &str,
    spinner_frame: usize,
) {
    let area = frame.area();
    let banner = chat.session.error.as_ref().map(error_lines);
    let banner_height = banner.as_ref().map_or(0, |lines| lines.len() as u16);

    let [header, body, banner_area, input, status] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(banner_height),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    render_header(frame, header, display_name);
    render_transcript(frame, body, chat);
    if let Some(lines) = banner {
        frame.render_widget(Paragraph::new(lines), banner_area);
    }
    render_input(frame, input, chat);
    render_status(frame, status, chat, spinner_frame);
}

fn render_header(frame: &mut Frame, area: Rect, display_name: &str) {
    let hints = "Ctrl+L sign out · Ctrl+C quit";
    let name_width = (area.width as usize)
        .saturating_sub(APP_NAME.width() + hints.width() + 6)
        .max(1);
    let line = Line::from(vec![
        Span::styled(
            format!(" {APP_NAME} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("· "),
        Span::styled(
            truncate_with_ellipsis(display_name, name_width),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_transcript(frame: &mut Frame, area: Rect, chat: &ChatState) {
    let inner = Rect {
        x: area.x + TRANSCRIPT_MARGIN,
        width: area.width.saturating_sub(TRANSCRIPT_MARGIN * 2),
        ..area
    };
    let lines = transcript_lines(chat, inner.width as usize);
    let height = inner.height as usize;

    let max_offset = lines.len().saturating_sub(height);
    let offset_from_bottom = chat.scroll_offset.min(max_offset);
    let start = max_offset - offset_from_bottom;

    let mut visible: Vec<Line<'static>> = lines.into_iter().skip(start).take(height).collect();
    // Bottom-align short transcripts.
    if visible.len() < height {
        let mut padded = vec![Line::default(); height - visible.len()];
        padded.append(&mut visible);
        visible = padded;
    }
    frame.render_widget(Paragraph::new(visible), inner);
}

/// Renders every message as a header line plus wrapped content.
pub fn transcript_lines(chat: &ChatState, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if chat.session.transcript.is_empty() {
        lines.push(Line::styled(
            "Ask anything. Your messages stay in this session only.",
            Style::default().fg(Color::DarkGray),
        ));
        return lines;
    }

    for message in &chat.session.transcript {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(message_header(message));
        let style = match message.role() {
            Role::User => Style::default().fg(Color::White),
            Role::Assistant => Style::default(),
        };
        let text = sanitize_for_display(message.content());
        for wrapped in wrap_text(&text, width.saturating_sub(2)) {
            lines.push(Line::styled(format!("  {wrapped}"), style));
        }
    }
    lines
}

fn message_header(message: &Message) -> Line<'static> {
    let (label, color) = match message.role() {
        Role::User => ("You", Color::Green),
        Role::Assistant => ("Assistant", Color::Cyan),
    };
    let time = message.created_at().with_timezone(&Local).format("%H:%M");
    Line::from(vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
    ])
}

fn error_lines(error: &ChatError) -> Vec<Line<'static>> {
    let color = match error.kind {
        ChatErrorKind::Authentication => Color::Yellow,
        ChatErrorKind::Server => Color::Red,
        ChatErrorKind::Network => Color::Magenta,
    };
    let mut lines = vec![Line::styled(
        format!(" ⚠ {}", error.message),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if error.kind == ChatErrorKind::Authentication {
        lines.push(Line::styled(
            "   Press Ctrl+L to sign out and back in.",
            Style::default().fg(color),
        ));
    }
    lines
}

fn render_input(frame: &mut Frame, area: Rect, chat: &ChatState) {
    let border = if chat.input_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Message ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let input = chat.session.input.as_str();
    // Keep the tail visible when the draft is wider than the box.
    let mut shown = input;
    while shown.width() >= inner_width && !shown.is_empty() {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }

    frame.render_widget(Paragraph::new(shown.to_string()).block(block), area);

    if chat.input_focused && !chat.session.sending {
        let x = area.x + 1 + shown.width() as u16;
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn render_status(frame: &mut Frame, area: Rect, chat: &ChatState, spinner_frame: usize) {
    let line = if chat.session.sending {
        Line::from(vec![
            Span::styled(
                format!(" {} ", spinner(spinner_frame)),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("Waiting for reply..."),
        ])
    } else {
        let follow = if chat.is_following() { "" } else { " · End latest" };
        Line::styled(
            format!(" Enter send · PgUp/PgDn scroll{follow}"),
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(line), area);
}
