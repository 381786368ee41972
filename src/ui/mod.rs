mod booking_view;
mod dashboard;
mod session_view;
mod terminal_guard;

pub use booking_view::BookingView;
pub use dashboard::Dashboard;
pub use session_view::SessionView;
pub use terminal_guard::{install_panic_hook, TerminalGuard};

use coachflow::flow::Gate;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

/// Helper to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Common chrome of a flow step: titled box, progress gauge, body area and a
/// footer with key hints. Returns the body area.
pub(crate) struct StepFrame<'a> {
    pub flow: &'a str,
    pub title: &'a str,
    pub position: usize,
    pub total: usize,
    pub progress: f64,
    pub gate: Gate,
    pub hints: &'a [(&'a str, &'a str)],
}

impl StepFrame<'_> {
    pub(crate) fn render(&self, frame: &mut Frame) -> Rect {
        let area = centered_rect(80, 85, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    self.flow,
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" - {} ", self.title)),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Progress
                Constraint::Length(1), // Spacer
                Constraint::Min(6),    // Step content
                Constraint::Length(1), // Gate status
                Constraint::Length(1), // Key hints
            ])
            .split(inner);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .label(format!("Step {} of {}", self.position, self.total))
            .ratio(self.progress.clamp(0.0, 1.0));
        frame.render_widget(gauge, chunks[0]);

        let gate_line = match self.gate {
            Gate::Open => Line::from(Span::styled(
                "Continue ready",
                Style::default().fg(Color::Green),
            )),
            Gate::Closed(reason) => Line::from(vec![
                Span::styled("Continue disabled: ", Style::default().fg(Color::DarkGray)),
                Span::styled(reason, Style::default().fg(Color::Yellow)),
            ]),
            Gate::Terminal => Line::from(Span::styled(
                "Final step",
                Style::default().fg(Color::Cyan),
            )),
        };
        frame.render_widget(Paragraph::new(gate_line).alignment(Alignment::Center), chunks[3]);

        let mut spans = Vec::new();
        for (i, (key, action)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  |  "));
            }
            spans.push(Span::styled(*key, Style::default().fg(Color::Green)));
            spans.push(Span::raw(format!(" {}", action)));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            chunks[4],
        );

        chunks[2]
    }
}

/// Checkbox glyph
pub(crate) fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Move a list highlight up or down within `len` items
pub(crate) fn step_selection(selected: Option<usize>, len: usize, down: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = selected.unwrap_or(0).min(len - 1);
    Some(if down {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_selection_clamps() {
        assert_eq!(step_selection(None, 0, true), None);
        assert_eq!(step_selection(None, 3, true), Some(1));
        assert_eq!(step_selection(Some(2), 3, true), Some(2));
        assert_eq!(step_selection(Some(0), 3, false), Some(0));
        assert_eq!(step_selection(Some(7), 3, false), Some(1));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 40, outer);
        assert!(inner.width <= 60);
        assert!(inner.x >= 20);
        assert!(inner.y >= 15);
    }
}
