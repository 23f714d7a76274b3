//! Text utilities for TUI rendering.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with an ellipsis if it exceeds `max_width` columns.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        truncated.push(ch);
        used += w;
    }
    truncated.push('…');
    truncated
}

/// Strips escape bytes and expands tabs so server text can't drive the terminal.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    if s.contains('\x1b') || s.contains('\t') {
        Cow::Owned(s.replace('\x1b', "").replace('\t', "    "))
    } else {
        Cow::Borrowed(s)
    }
}

/// Wraps text to `width` columns, breaking on spaces where possible and
/// hard-splitting words that are wider than a line. Embedded newlines are
/// kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in raw.split(' ') {
            let word_width = word.width();
            let sep = usize::from(!line.is_empty());

            if line_width + sep + word_width <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            for ch in word.chars() {
                let w = ch.width().unwrap_or(0);
                if line_width + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(ch);
                line_width += w;
            }
        }

        lines.push(line);
    }

    lines
}
