use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use coachflow::booking::BookingDraft;
use coachflow::session::{format_elapsed, SessionDraft, SessionRecord, SessionStatus};

use super::step_selection;

/// Host screen listing today's sessions and the bookings made this run
pub struct Dashboard {
    sessions: Vec<SessionRecord>,
    bookings: Vec<BookingDraft>,
    state: ListState,
    status: Option<String>,
}

impl Dashboard {
    pub fn new(sessions: Vec<SessionRecord>) -> Self {
        let mut state = ListState::default();
        if !sessions.is_empty() {
            state.select(Some(0));
        }
        Self {
            sessions,
            bookings: Vec::new(),
            state,
            status: None,
        }
    }

    pub fn selected_session(&self) -> Option<&SessionRecord> {
        self.state.selected().and_then(|i| self.sessions.get(i))
    }

    pub fn move_selection(&mut self, down: bool) {
        let next = step_selection(self.state.selected(), self.sessions.len(), down);
        self.state.select(next);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    pub fn add_booking(&mut self, draft: BookingDraft) {
        let client = draft.client.as_ref().map(|c| c.name.clone()).unwrap_or_default();
        self.set_status(format!("Booked {} ({})", client, booking_when(&draft)));
        self.bookings.push(draft);
    }

    /// Replace the session record with the completed one
    pub fn complete_session(&mut self, draft: SessionDraft) {
        let summary = draft.summary();
        self.set_status(format!(
            "Completed {} with {}: {}/{} exercises in {}",
            draft.session.service,
            draft.session.client,
            summary.completed_exercises,
            summary.total_exercises,
            format_elapsed(summary.elapsed_secs)
        ));
        if let Some(existing) = self.sessions.iter_mut().find(|s| s.id == draft.session.id) {
            *existing = draft.session;
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(8),    // Main content
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        let today = chrono::Local::now().date_naive();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                " coachflow ",
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}", today.format("%A, %B %-d"))),
        ]));
        frame.render_widget(header, chunks[0]);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let sessions: Vec<ListItem> = self
            .sessions
            .iter()
            .map(|s| {
                let color = match s.status {
                    SessionStatus::Completed => Color::DarkGray,
                    SessionStatus::StartingSoon => Color::Yellow,
                    SessionStatus::Upcoming => Color::White,
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:>8}  ", s.time), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{:<10} {:<20} ${:<4} ", s.client, s.service, s.price)),
                    Span::styled(s.status.label(), Style::default().fg(color)),
                ]))
            })
            .collect();
        let sessions = List::new(sessions)
            .block(
                Block::default()
                    .title(" Today's Sessions ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(sessions, main_chunks[0], &mut self.state);

        let bookings: Vec<ListItem> = if self.bookings.is_empty() {
            vec![ListItem::new(Span::styled(
                "No new bookings",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.bookings
                .iter()
                .map(|b| {
                    let client = b.client.as_ref().map(|c| c.name.as_str()).unwrap_or("?");
                    let service = b.service.as_ref().map(|s| s.name.as_str()).unwrap_or("?");
                    ListItem::new(vec![
                        Line::from(format!("{} - {}", client, service)),
                        Line::from(Span::styled(
                            format!("  {} @ {}", booking_when(b), b.location),
                            Style::default().fg(Color::DarkGray),
                        )),
                    ])
                })
                .collect()
        };
        frame.render_widget(
            List::new(bookings).block(Block::default().title(" Booked ").borders(Borders::ALL)),
            main_chunks[1],
        );

        let mut status = vec![
            Span::styled("a", Style::default().fg(Color::Green)),
            Span::raw(" add session  "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" start  "),
            Span::styled("q", Style::default().fg(Color::Green)),
            Span::raw(" quit"),
        ];
        if let Some(message) = &self.status {
            status.push(Span::raw("   "));
            status.push(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)));
        }
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[2]);
    }
}

fn booking_when(draft: &BookingDraft) -> String {
    match (draft.date, draft.time) {
        (Some(date), Some(time)) => format!("{} {}", date.format("%b %-d"), time),
        _ => "unscheduled".to_string(),
    }
}
