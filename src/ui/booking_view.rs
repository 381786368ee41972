//! Booking wizard screen

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::warn;

use coachflow::booking::{BookingStep, BookingWizard, Location};
use coachflow::flow::Advance;

use super::{checkbox, step_selection, StepFrame};

/// Rows of the details step before the equipment options
const DETAIL_LOCATION: usize = 0;
const DETAIL_NOTES: usize = 1;
const DETAIL_FIXED_ROWS: usize = 2;

pub struct BookingView {
    /// Taken by `confirm`; `None` once the booking was emitted
    wizard: Option<BookingWizard>,
    search: String,
    list: ListState,
    date_index: usize,
    notice: Option<String>,
}

impl BookingView {
    pub fn new(wizard: BookingWizard) -> Self {
        let mut list = ListState::default();
        list.select(Some(0));
        Self {
            wizard: Some(wizard),
            search: String::new(),
            list,
            date_index: 0,
            notice: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        self.notice = None;

        match code {
            KeyCode::Esc => {
                wizard.back();
                self.reset_list();
                return;
            }
            KeyCode::Up | KeyCode::Down => {
                let len = self.list_len();
                let next = step_selection(self.list.selected(), len, code == KeyCode::Down);
                self.list.select(next);
                return;
            }
            _ => {}
        }

        let result = match self.step() {
            Some(BookingStep::ClientSelection) => self.client_key(code),
            Some(BookingStep::ServiceSelection) => self.service_key(code),
            Some(BookingStep::DatetimeSelection) => self.datetime_key(code),
            Some(BookingStep::Details) => self.details_key(code),
            Some(BookingStep::Confirmation) => {
                if code == KeyCode::Enter {
                    self.confirm();
                }
                Ok(())
            }
            None => Ok(()),
        };
        if let Err(err) = result {
            warn!(code = err.code(), error = %err, "booking action rejected");
            self.notice = Some(err.to_string());
        }
    }

    fn step(&self) -> Option<BookingStep> {
        self.wizard.as_ref().map(BookingWizard::step)
    }

    fn reset_list(&mut self) {
        self.list.select(Some(0));
    }

    fn list_len(&self) -> usize {
        let Some(wizard) = self.wizard.as_ref() else {
            return 0;
        };
        match wizard.step() {
            BookingStep::ClientSelection => wizard.search_clients(&self.search).len(),
            BookingStep::ServiceSelection => wizard.services().len(),
            BookingStep::DatetimeSelection => wizard.context().time_slots.len(),
            BookingStep::Details => DETAIL_FIXED_ROWS + wizard.equipment_options().len(),
            BookingStep::Confirmation => 0,
        }
    }

    fn next(&mut self) {
        let Some(wizard) = self.wizard.as_mut() else {
            return;
        };
        match wizard.next() {
            Advance::Moved { .. } => self.reset_list(),
            Advance::Blocked { reason, .. } => self.notice = Some(reason.to_string()),
            Advance::Complete => {}
        }
    }

    fn confirm(&mut self) {
        let Some(wizard) = self.wizard.take() else {
            return;
        };
        if let Err(wizard) = wizard.confirm() {
            self.notice = Some("Client, service, date and time are required".to_string());
            self.wizard = Some(wizard);
        }
    }

    fn client_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(());
        };
        match code {
            KeyCode::Enter => {
                let picked = self
                    .list
                    .selected()
                    .and_then(|i| wizard.search_clients(&self.search).get(i).map(|c| c.id));
                if let Some(id) = picked {
                    wizard.select_client(id)?;
                }
                self.next();
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.reset_list();
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.reset_list();
            }
            _ => {}
        }
        Ok(())
    }

    fn service_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(());
        };
        if code == KeyCode::Enter {
            let picked = self
                .list
                .selected()
                .and_then(|i| wizard.services().get(i).map(|s| s.id));
            if let Some(id) = picked {
                wizard.select_service(id)?;
            }
            self.next();
        }
        Ok(())
    }

    fn datetime_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(());
        };
        let dates = wizard.dates();
        match code {
            KeyCode::Left | KeyCode::Right => {
                if dates.is_empty() {
                    return Ok(());
                }
                self.date_index = if code == KeyCode::Right {
                    (self.date_index + 1).min(dates.len() - 1)
                } else {
                    self.date_index.saturating_sub(1)
                };
                wizard.select_date(dates[self.date_index])?;
            }
            KeyCode::Char(' ') => {
                if let Some(&date) = dates.get(self.date_index) {
                    wizard.select_date(date)?;
                }
            }
            KeyCode::Enter => {
                if wizard.draft().date.is_none() {
                    if let Some(&date) = dates.get(self.date_index) {
                        wizard.select_date(date)?;
                    }
                }
                let slot = self
                    .list
                    .selected()
                    .and_then(|i| wizard.context().time_slots.get(i).copied());
                if let Some(slot) = slot {
                    if !wizard.select_time(slot)? {
                        self.notice = Some(format!("{} is not available", slot));
                        return Ok(());
                    }
                }
                self.next();
            }
            _ => {}
        }
        Ok(())
    }

    fn details_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(wizard) = self.wizard.as_mut() else {
            return Ok(());
        };
        let row = self.list.selected().unwrap_or(0);
        match (row, code) {
            (_, KeyCode::Enter) => self.next(),
            (DETAIL_LOCATION, KeyCode::Left | KeyCode::Right) => {
                let all = Location::all();
                let current = all
                    .iter()
                    .position(|&l| l == wizard.draft().location)
                    .unwrap_or(0);
                let next = if code == KeyCode::Right {
                    (current + 1) % all.len()
                } else {
                    (current + all.len() - 1) % all.len()
                };
                wizard.set_location(all[next])?;
            }
            (DETAIL_NOTES, KeyCode::Char(c)) => {
                let mut notes = wizard.draft().notes.clone();
                notes.push(c);
                wizard.set_notes(notes)?;
            }
            (DETAIL_NOTES, KeyCode::Backspace) => {
                let mut notes = wizard.draft().notes.clone();
                notes.pop();
                wizard.set_notes(notes)?;
            }
            (row, KeyCode::Char(' ')) if row >= DETAIL_FIXED_ROWS => {
                let item = wizard
                    .equipment_options()
                    .get(row - DETAIL_FIXED_ROWS)
                    .cloned();
                if let Some(item) = item {
                    wizard.toggle_equipment(&item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let step = wizard.step();
        let hints: &[(&str, &str)] = match step {
            BookingStep::ClientSelection => &[("type", "search"), ("Enter", "select"), ("Esc", "cancel")],
            BookingStep::DatetimeSelection => {
                &[("←/→", "date"), ("↑/↓", "time"), ("Enter", "select"), ("Esc", "back")]
            }
            BookingStep::Details => &[
                ("←/→", "location"),
                ("type", "notes"),
                ("Space", "equipment"),
                ("Enter", "continue"),
            ],
            BookingStep::Confirmation => &[("Enter", "confirm"), ("Esc", "back")],
            BookingStep::ServiceSelection => &[("Enter", "select"), ("Esc", "back")],
        };
        let body = StepFrame {
            flow: "New Session",
            title: step.title(),
            position: wizard.position(),
            total: wizard.total_steps(),
            progress: wizard.progress(),
            gate: wizard.gate(),
            hints,
        }
        .render(frame);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(body);

        match step {
            BookingStep::ClientSelection => self.render_clients(frame, chunks[0]),
            BookingStep::ServiceSelection => self.render_services(frame, chunks[0]),
            BookingStep::DatetimeSelection => self.render_datetime(frame, chunks[0]),
            BookingStep::Details => self.render_details(frame, chunks[0]),
            BookingStep::Confirmation => self.render_confirmation(frame, chunks[0]),
        }

        if let Some(notice) = &self.notice {
            frame.render_widget(
                Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red))),
                chunks[1],
            );
        }
    }

    fn render_list(&mut self, frame: &mut Frame, area: Rect, title: String, items: Vec<ListItem>) {
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.list);
    }

    fn render_clients(&mut self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let chosen = wizard.draft().client.as_ref().map(|c| c.id);
        let items = wizard
            .search_clients(&self.search)
            .into_iter()
            .map(|c| {
                let marker = if chosen == Some(c.id) { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{:<3}", c.initials()), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{:<12}", c.name)),
                    Span::styled(
                        format!("{} sessions, last {}", c.total_sessions, c.last_session),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();
        let title = format!(" Search: {}_ ", self.search);
        self.render_list(frame, area, title, items);
    }

    fn render_services(&mut self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let chosen = wizard.draft().service.as_ref().map(|s| s.id);
        let items = wizard
            .services()
            .iter()
            .map(|s| {
                let marker = if chosen == Some(s.id) { "● " } else { "  " };
                ListItem::new(vec![
                    Line::from(format!("{}{:<24} {:>3} min  ${}", marker, s.name, s.duration, s.price)),
                    Line::from(Span::styled(
                        format!("    {}", s.description),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();
        self.render_list(frame, area, " Services ".to_string(), items);
    }

    fn render_datetime(&mut self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let cursor_date = wizard.dates().get(self.date_index).copied();
        let date_line = match (cursor_date, wizard.draft().date) {
            (Some(cursor), Some(chosen)) if cursor == chosen => {
                format!("◀ {} ▶  (selected)", cursor.format("%a %b %-d"))
            }
            (Some(cursor), _) => format!("◀ {} ▶", cursor.format("%a %b %-d")),
            (None, _) => "No bookable dates".to_string(),
        };
        frame.render_widget(
            Paragraph::new(date_line).block(Block::default().title(" Date ").borders(Borders::ALL)),
            chunks[0],
        );

        let chosen_time = wizard.draft().time;
        let items = wizard
            .time_slots()
            .into_iter()
            .map(|(slot, available)| {
                let style = if available {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let marker = if chosen_time == Some(slot) { "● " } else { "  " };
                ListItem::new(Span::styled(format!("{}{}", marker, slot), style))
            })
            .collect();
        self.render_list(frame, chunks[1], " Time ".to_string(), items);
    }

    fn render_details(&mut self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let draft = wizard.draft();
        let mut items = vec![
            ListItem::new(format!("Location: ◀ {} ▶", draft.location)),
            ListItem::new(format!("Notes: {}_", draft.notes)),
        ];
        items.extend(wizard.equipment_options().iter().map(|item| {
            let checked = draft.equipment.contains(item);
            ListItem::new(format!("{} {}", checkbox(checked), item))
        }));
        let title = format!(" {} min, ${} ", draft.duration, draft.price);
        self.render_list(frame, area, title, items);
    }

    fn render_confirmation(&self, frame: &mut Frame, area: Rect) {
        let Some(wizard) = self.wizard.as_ref() else {
            return;
        };
        let draft = wizard.draft();
        let field = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        };
        let lines = vec![
            field(
                "Client",
                draft.client.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            ),
            field(
                "Service",
                draft.service.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            ),
            field(
                "Date",
                draft.date.map(|d| d.format("%A, %B %-d").to_string()).unwrap_or_default(),
            ),
            field(
                "Time",
                draft.time.map(|t| t.to_string()).unwrap_or_default(),
            ),
            field("Duration", format!("{} min", draft.duration)),
            field("Location", draft.location.to_string()),
            field("Price", format!("${}", draft.price)),
            field("Equipment", draft.equipment.join(", ")),
            field("Notes", draft.notes.clone()),
        ];
        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}
