//! Source code pane rendering with syntax highlighting
//!
//! Shows the program text with line numbers and a character-level tokenizer
//! for keywords, strings, numbers, comments and the visualizer's own
//! capabilities. In edit mode the cursor line is tinted and the terminal
//! cursor is placed at the edit position.

use crate::interpreter::constants::ARRAY_BINDINGS;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEYWORDS: &[&str] = &[
    "const", "let", "var", "function", "async", "await", "return", "if", "else", "while", "for",
    "do", "break", "continue", "throw", "new", "typeof",
];

const LITERALS: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity"];

const CAPABILITIES: &[&str] = &["highlightElement", "updateArrayData", "log", "delay", "Math"];

/// Simple syntax highlighting for the script subset
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];

        // Handle comments
        if c == '/' && chars.get(i + 1).is_some_and(|&(_, next)| next == '/') {
            flush_word(&mut spans, &mut current_word, false);
            spans.push(Span::styled(
                &line[offset..],
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Handle strings
        if c == '"' || c == '\'' || c == '`' {
            flush_word(&mut spans, &mut current_word, false);
            let mut end = i + 1;
            while end < chars.len() && chars[end].1 != c {
                if chars[end].1 == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            end = (end + 1).min(chars.len());
            let end_offset = chars.get(end).map_or(line.len(), |&(o, _)| o);
            spans.push(Span::styled(
                &line[offset..end_offset],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Handle non-alphanumeric (delimiters)
        if !c.is_alphanumeric() && c != '_' && c != '$' && !(c == '.' && is_number(&current_word)) {
            flush_word(&mut spans, &mut current_word, c == '(');

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };
            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    flush_word(&mut spans, &mut current_word, false);
    Line::from(spans)
}

fn flush_word(spans: &mut Vec<Span<'_>>, word: &mut String, is_call: bool) {
    if word.is_empty() {
        return;
    }
    let style = get_keyword_style(word, is_call);
    spans.push(Span::styled(std::mem::take(word), style));
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn get_keyword_style(word: &str, is_call: bool) -> Style {
    if KEYWORDS.contains(&word) {
        Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD)
    } else if LITERALS.contains(&word) || is_number(word) {
        Style::default().fg(DEFAULT_THEME.number)
    } else if CAPABILITIES.contains(&word) || ARRAY_BINDINGS.contains(&word) {
        Style::default().fg(DEFAULT_THEME.capability)
    } else if is_call {
        Style::default().fg(DEFAULT_THEME.function)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    }
}

/// Edit cursor position within the source, zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditCursor {
    pub line: usize,
    pub column: usize,
}

/// Render the source code pane
///
/// `scroll` is clamped in place; when `cursor` is set it is also moved so the
/// cursor line stays visible.
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[String],
    is_focused: bool,
    cursor: Option<EditCursor>,
    scroll: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let title = if cursor.is_some() {
        " Source Code [EDIT] "
    } else {
        " Source Code "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if let Some(cursor) = cursor {
        if cursor.line < *scroll {
            *scroll = cursor.line;
        } else if cursor.line >= *scroll + visible_height {
            *scroll = cursor.line + 1 - visible_height;
        }
    }
    *scroll = (*scroll).min(total_lines.saturating_sub(visible_height));

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll)
        .take(visible_height)
        .map(|(idx, line)| {
            let is_cursor_line = cursor.is_some_and(|c| c.line == idx);
            let num_style = if is_cursor_line {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut content_line = highlight_source_code(line);
            if is_cursor_line {
                for span in &mut content_line.spans {
                    span.style = span.style.bg(DEFAULT_THEME.current_line_bg);
                }
            }

            let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
            spans.extend(content_line.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);

    if let Some(cursor) = cursor {
        let row = cursor.line.saturating_sub(*scroll) as u16;
        // Border + line number gutter
        let col = 1 + 5 + cursor.column as u16;
        if col < area.width.saturating_sub(1) {
            frame.set_cursor_position(Position::new(area.x + col, area.y + 1 + row));
        }
    }
}
