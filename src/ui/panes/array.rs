//! Array pane: one bar per element, the highlighted element in a contrasting color

use crate::memory::value::format_number;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

/// Resolution of the tallest bar
const BAR_SCALE: u64 = 100;

/// Map values onto bar heights in `1..=BAR_SCALE`, keeping their order.
///
/// Negative and fractional values are shifted so the smallest element still
/// gets a visible bar; non-finite values get the minimum height.
pub fn bar_heights(values: &[f64]) -> Vec<u64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return 1;
            }
            let low = min.min(0.0);
            let span = max - low;
            if span <= 0.0 {
                return BAR_SCALE;
            }
            let scaled = ((v - low) / span * (BAR_SCALE - 1) as f64).round() as u64;
            scaled + 1
        })
        .collect()
}

/// Render the array pane
pub fn render_array_pane(
    frame: &mut Frame,
    area: Rect,
    values: &[f64],
    highlighted: Option<usize>,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Array ({}) ", values.len()))
        .borders(Borders::ALL)
        .border_style(border_style);

    if values.is_empty() {
        let paragraph = Paragraph::new("(no array)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let n = values.len() as u16;
    let bar_gap = if inner.width >= n * 3 { 1 } else { 0 };
    let bar_width = (inner.width.saturating_sub(bar_gap * n) / n.max(1)).max(1);

    let heights = bar_heights(values);
    let bars: Vec<Bar> = values
        .iter()
        .zip(&heights)
        .enumerate()
        .map(|(i, (value, height))| {
            let color = if Some(i) == highlighted {
                DEFAULT_THEME.bar_highlight
            } else {
                DEFAULT_THEME.bar
            };
            Bar::default()
                .value(*height)
                .text_value(format_number(*value))
                .label(Line::from(i.to_string()))
                .style(Style::default().fg(color))
                .value_style(Style::default().bg(color).fg(Color::Black))
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .max(BAR_SCALE);
    frame.render_widget(chart, rows[0]);

    let marker = match highlighted {
        Some(i) if i < values.len() => {
            format!("index {} = {}", i, format_number(values[i]))
        }
        Some(i) => format!("index {} (out of range)", i),
        None => "no element highlighted".to_string(),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        marker,
        Style::default().fg(DEFAULT_THEME.comment),
    )));
    frame.render_widget(footer, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_heights_preserve_order() {
        let heights = bar_heights(&[9.0, 0.0, 4.5]);
        assert_eq!(heights[0], BAR_SCALE);
        assert_eq!(heights[1], 1);
        assert!(heights[1] < heights[2] && heights[2] < heights[0]);
    }

    #[test]
    fn test_bar_heights_negative_and_flat() {
        let heights = bar_heights(&[-2.0, 2.0]);
        assert_eq!(heights, vec![1, BAR_SCALE]);
        assert_eq!(bar_heights(&[3.0, 3.0]), vec![100, 100]);
        assert_eq!(bar_heights(&[f64::NAN, 1.0]), vec![1, 100]);
    }
}
