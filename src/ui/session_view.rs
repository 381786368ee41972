//! Session-execution screen. Owns the tick source while the timer runs.

use std::time::Duration;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, warn};

use coachflow::flow::Advance;
use coachflow::session::{
    format_elapsed, Feedback, PerformanceMetric, PerformanceRatings, SessionFlow, SessionStep, Ticker,
};
use coachflow::FlowError;

use super::{checkbox, step_selection, StepFrame};

/// Length given to exercises added from the keyboard
const NEW_EXERCISE_MINUTES: u32 = 10;

/// Panels of the pre-session step, cycled with Tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreField {
    Checklist,
    Plan,
    Notes,
}

impl PreField {
    fn next(self) -> Self {
        match self {
            PreField::Checklist => PreField::Plan,
            PreField::Plan => PreField::Notes,
            PreField::Notes => PreField::Checklist,
        }
    }
}

/// Text fields of the post-session step, cycled with Tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostField {
    Notes,
    Comments,
    NextPlan,
    FollowUps,
}

impl PostField {
    fn next(self) -> Self {
        match self {
            PostField::Notes => PostField::Comments,
            PostField::Comments => PostField::NextPlan,
            PostField::NextPlan => PostField::FollowUps,
            PostField::FollowUps => PostField::Notes,
        }
    }
}

pub struct SessionView {
    /// Taken by `complete`; `None` once the session was emitted
    flow: Option<SessionFlow>,
    /// Alive exactly while the timer runs inside during-session
    ticker: Option<Ticker>,
    tick_interval: Duration,
    list: ListState,
    metric: usize,
    pre_field: PreField,
    /// Name of the exercise being typed into the plan panel
    exercise_input: String,
    /// `n` during the session routes typing into the live notes
    editing_live_notes: bool,
    post_field: PostField,
    notice: Option<String>,
}

impl SessionView {
    pub fn new(flow: SessionFlow, tick_interval: Duration) -> Self {
        let mut list = ListState::default();
        list.select(Some(0));
        let mut view = Self {
            flow: Some(flow),
            ticker: None,
            tick_interval,
            list,
            metric: 0,
            pre_field: PreField::Checklist,
            exercise_input: String::new(),
            editing_live_notes: false,
            post_field: PostField::Notes,
            notice: None,
        };
        view.sync_ticker();
        view
    }

    /// Feed ticks delivered since the last call into the tracker
    pub fn pump_ticks(&mut self) {
        let (Some(ticker), Some(flow)) = (self.ticker.as_mut(), self.flow.as_mut()) else {
            return;
        };
        for _ in 0..ticker.drain() {
            flow.tick();
        }
    }

    /// Hold a ticker only while the flow is in during-session with the timer running
    fn sync_ticker(&mut self) {
        let wanted = self.flow.as_ref().is_some_and(|flow| {
            flow.step() == SessionStep::DuringSession && flow.draft().timer.is_running()
        });
        match (wanted, self.ticker.is_some()) {
            (true, false) => self.ticker = Some(Ticker::spawn(self.tick_interval)),
            (false, true) => {
                // Fold in anything already delivered before releasing the ticker
                self.pump_ticks();
                self.ticker = None;
                debug!("session ticker released");
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.flow.is_none() {
            return;
        }
        self.notice = None;
        self.pump_ticks();

        if self.editing_live_notes {
            if let Err(err) = self.live_notes_key(code) {
                self.reject(err);
            }
            self.sync_ticker();
            return;
        }

        match code {
            KeyCode::Esc => {
                if let Some(flow) = self.flow.as_mut() {
                    flow.back();
                }
                self.exercise_input.clear();
                self.list.select(Some(0));
            }
            KeyCode::Up | KeyCode::Down => {
                let len = self.list_len();
                let next = step_selection(self.list.selected(), len, code == KeyCode::Down);
                self.list.select(next);
            }
            KeyCode::Enter if self.step() == Some(SessionStep::Summary) => self.complete(),
            KeyCode::Enter if !self.exercise_input.trim().is_empty() => {
                if let Err(err) = self.add_typed_exercise() {
                    self.reject(err);
                }
            }
            KeyCode::Enter => self.next(),
            _ => {
                if let Err(err) = self.step_key(code) {
                    self.reject(err);
                }
            }
        }
        self.sync_ticker();
    }

    fn reject(&mut self, err: FlowError) {
        warn!(code = err.code(), error = %err, "session action rejected");
        self.notice = Some(err.to_string());
    }

    fn step(&self) -> Option<SessionStep> {
        self.flow.as_ref().map(SessionFlow::step)
    }

    fn list_len(&self) -> usize {
        let Some(flow) = self.flow.as_ref() else {
            return 0;
        };
        let draft = flow.draft();
        match flow.step() {
            SessionStep::PreSession => match self.pre_field {
                PreField::Checklist => draft.checklist.len(),
                PreField::Plan => draft.total_exercises(),
                PreField::Notes => 0,
            },
            SessionStep::DuringSession => draft.total_exercises(),
            SessionStep::PostSession => draft.follow_ups.len(),
            SessionStep::Details | SessionStep::Summary => 0,
        }
    }

    fn next(&mut self) {
        let Some(flow) = self.flow.as_mut() else {
            return;
        };
        match flow.next() {
            Advance::Moved { .. } => self.list.select(Some(0)),
            Advance::Blocked { reason, .. } => self.notice = Some(reason.to_string()),
            Advance::Complete => {}
        }
    }

    fn complete(&mut self) {
        let Some(flow) = self.flow.take() else {
            return;
        };
        if let Err(flow) = flow.complete() {
            self.flow = Some(flow);
        }
    }

    fn add_typed_exercise(&mut self) -> coachflow::Result<()> {
        let Some(flow) = self.flow.as_mut() else {
            return Ok(());
        };
        flow.add_exercise(self.exercise_input.trim(), NEW_EXERCISE_MINUTES)?;
        self.exercise_input.clear();
        let last = flow.draft().total_exercises().saturating_sub(1);
        self.list.select(Some(last));
        Ok(())
    }

    /// Esc or Enter ends editing; the session keys are inactive meanwhile
    fn live_notes_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(flow) = self.flow.as_mut() else {
            return Ok(());
        };
        let mut text = flow.draft().live_notes.clone();
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing_live_notes = false;
                return Ok(());
            }
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            _ => return Ok(()),
        }
        flow.set_live_notes(text)
    }

    fn step_key(&mut self, code: KeyCode) -> coachflow::Result<()> {
        let Some(flow) = self.flow.as_mut() else {
            return Ok(());
        };
        let selected = self.list.selected().unwrap_or(0);
        match (flow.step(), code) {
            (SessionStep::PreSession, KeyCode::Tab) => {
                self.pre_field = self.pre_field.next();
                self.exercise_input.clear();
                self.list.select(Some(0));
            }
            (SessionStep::PreSession, KeyCode::Char(' ')) if self.pre_field == PreField::Checklist => {
                flow.toggle_checklist(selected)?;
            }
            (SessionStep::PreSession, KeyCode::Delete) if self.pre_field == PreField::Plan => {
                flow.remove_exercise(selected)?;
                let len = flow.draft().total_exercises();
                self.list.select(len.checked_sub(1).map(|last| selected.min(last)));
            }
            (SessionStep::PreSession, KeyCode::Char(c)) if self.pre_field == PreField::Plan => {
                self.exercise_input.push(c);
            }
            (SessionStep::PreSession, KeyCode::Backspace) if self.pre_field == PreField::Plan => {
                self.exercise_input.pop();
            }
            (SessionStep::PreSession, KeyCode::Char(_) | KeyCode::Backspace)
                if self.pre_field == PreField::Notes =>
            {
                let mut text = flow.draft().prep_notes.clone();
                match code {
                    KeyCode::Char(c) => text.push(c),
                    _ => {
                        text.pop();
                    }
                }
                flow.set_prep_notes(text)?;
            }
            (SessionStep::DuringSession, KeyCode::Char('t')) => {
                flow.toggle_timer()?;
            }
            (SessionStep::DuringSession, KeyCode::Char('c')) => {
                flow.complete_exercise(selected)?;
                let current = flow.draft().current_exercise;
                self.list.select(Some(current));
            }
            (SessionStep::DuringSession, KeyCode::Char('s')) => {
                flow.skip_exercise()?;
                let current = flow.draft().current_exercise;
                self.list.select(Some(current));
            }
            (SessionStep::DuringSession, KeyCode::Char(' ')) => {
                flow.toggle_exercise_completed(selected)?;
            }
            (SessionStep::DuringSession, KeyCode::Char('n')) => {
                self.editing_live_notes = true;
            }
            (SessionStep::DuringSession, KeyCode::Tab) => {
                self.metric = (self.metric + 1) % PerformanceMetric::all().len();
            }
            (SessionStep::DuringSession, KeyCode::Left | KeyCode::Right) => {
                let metric = PerformanceMetric::all()[self.metric];
                let current = flow.draft().performance.get(metric);
                let value = if code == KeyCode::Right {
                    current.saturating_add(1).min(PerformanceRatings::MAX)
                } else {
                    current.saturating_sub(1).max(PerformanceRatings::MIN)
                };
                if value != current {
                    flow.set_performance(metric, value)?;
                }
            }
            (SessionStep::PostSession, KeyCode::Tab) => {
                self.post_field = self.post_field.next();
            }
            (SessionStep::PostSession, KeyCode::Left | KeyCode::Right) => {
                let current = flow.draft().feedback.rating;
                // Left on an unrated session stays unrated
                let rating = match (current, code) {
                    (None, KeyCode::Right) => Some(Feedback::MIN_RATING),
                    (None, _) => None,
                    (Some(r), KeyCode::Right) => Some(r.saturating_add(1).min(Feedback::MAX_RATING)),
                    (Some(r), _) => Some(r.saturating_sub(1).max(Feedback::MIN_RATING)),
                };
                if let Some(rating) = rating.filter(|_| rating != current) {
                    flow.set_feedback_rating(rating)?;
                }
            }
            (SessionStep::PostSession, KeyCode::Char(' ')) if self.post_field == PostField::FollowUps => {
                flow.toggle_follow_up(selected)?;
            }
            (SessionStep::PostSession, KeyCode::Char(_) | KeyCode::Backspace) => {
                let draft = flow.draft();
                let mut text = match self.post_field {
                    PostField::Notes => draft.notes.clone(),
                    PostField::Comments => draft.feedback.comments.clone(),
                    PostField::NextPlan => draft.next_session_plan.clone(),
                    PostField::FollowUps => return Ok(()),
                };
                match code {
                    KeyCode::Char(c) => text.push(c),
                    _ => {
                        text.pop();
                    }
                }
                match self.post_field {
                    PostField::Notes => flow.set_notes(text)?,
                    PostField::Comments => flow.set_feedback_comments(text)?,
                    PostField::NextPlan => flow.set_next_session_plan(text)?,
                    PostField::FollowUps => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let step = flow.step();
        let hints: &[(&str, &str)] = match step {
            SessionStep::Details => &[("Enter", "start preparing"), ("Esc", "close")],
            SessionStep::PreSession => &[
                ("Tab", "panel"),
                ("Space", "check"),
                ("Del", "remove exercise"),
                ("Enter", "add / start session"),
                ("Esc", "back"),
            ],
            SessionStep::DuringSession if self.editing_live_notes => &[("Enter/Esc", "done")],
            SessionStep::DuringSession => &[
                ("t", "timer"),
                ("c", "complete"),
                ("s", "skip"),
                ("n", "notes"),
                ("Tab/←/→", "rate"),
                ("Enter", "end session"),
            ],
            SessionStep::PostSession => &[
                ("Tab", "field"),
                ("←/→", "stars"),
                ("Space", "follow-up"),
                ("Enter", "summary"),
            ],
            SessionStep::Summary => &[("Enter", "complete"), ("Esc", "back")],
        };
        let title = format!("{} - {}", step.title(), flow.draft().session.client);
        let body = StepFrame {
            flow: "Session",
            title: &title,
            position: flow.position(),
            total: flow.total_steps(),
            progress: flow.progress(),
            gate: flow.gate(),
            hints,
        }
        .render(frame);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(body);

        match step {
            SessionStep::Details => self.render_details(frame, chunks[0]),
            SessionStep::PreSession => self.render_pre(frame, chunks[0]),
            SessionStep::DuringSession => self.render_during(frame, chunks[0]),
            SessionStep::PostSession => self.render_post(frame, chunks[0]),
            SessionStep::Summary => self.render_summary(frame, chunks[0]),
        }

        if let Some(notice) = &self.notice {
            frame.render_widget(
                Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Red))),
                chunks[1],
            );
        }
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let session = &flow.draft().session;
        let mut lines = vec![
            Line::from(format!("{} at {}", session.service, session.time)),
            Line::from(format!("{}  ·  ${}  ·  {}", session.location, session.price, session.status.label())),
            Line::from(""),
            Line::from(Span::styled("Goals", Style::default().add_modifier(Modifier::BOLD))),
        ];
        lines.extend(session.goals.iter().map(|g| Line::from(format!("  • {}", g))));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Plan", Style::default().add_modifier(Modifier::BOLD))));
        lines.extend(
            session
                .session_plan
                .iter()
                .map(|e| Line::from(format!("  {} ({} min)", e.name, e.duration))),
        );
        if !session.notes.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                session.notes.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
    }

    fn render_pre(&mut self, frame: &mut Frame, area: Rect) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let draft = flow.draft();
        let checklist_height = u16::try_from(draft.checklist.len()).unwrap_or(u16::MAX).saturating_add(2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(checklist_height),
                Constraint::Min(3),    // Plan
                Constraint::Length(3), // New exercise
                Constraint::Length(3), // Prep notes
            ])
            .split(area);

        let focus = |field: PreField| {
            if self.pre_field == field {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let checklist = List::new(
            draft
                .checklist
                .iter()
                .map(|item| ListItem::new(format!("{} {}", checkbox(item.checked), item.label)))
                .collect::<Vec<_>>(),
        )
        .block(
            Block::default()
                .title(" Preparation ")
                .borders(Borders::ALL)
                .border_style(focus(PreField::Checklist)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let plan = List::new(
            draft
                .plan()
                .iter()
                .map(|e| ListItem::new(format!("{} ({} min)", e.name, e.duration)))
                .collect::<Vec<_>>(),
        )
        .block(
            Block::default()
                .title(" Plan ")
                .borders(Borders::ALL)
                .border_style(focus(PreField::Plan)),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let input = Paragraph::new(self.exercise_input.clone()).block(
            Block::default()
                .title(" Add exercise ")
                .borders(Borders::ALL)
                .border_style(focus(PreField::Plan)),
        );
        let notes = Paragraph::new(draft.prep_notes.clone()).block(
            Block::default()
                .title(" Prep notes ")
                .borders(Borders::ALL)
                .border_style(focus(PreField::Notes)),
        );

        // Only the focused list shows the selection
        match self.pre_field {
            PreField::Checklist => {
                frame.render_stateful_widget(checklist, chunks[0], &mut self.list);
                frame.render_widget(plan, chunks[1]);
            }
            PreField::Plan => {
                frame.render_widget(checklist, chunks[0]);
                frame.render_stateful_widget(plan, chunks[1], &mut self.list);
            }
            PreField::Notes => {
                frame.render_widget(checklist, chunks[0]);
                frame.render_widget(plan, chunks[1]);
            }
        }
        frame.render_widget(input, chunks[2]);
        frame.render_widget(notes, chunks[3]);
    }

    fn render_during(&mut self, frame: &mut Frame, area: Rect) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let draft = flow.draft();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Timer
                Constraint::Length(1), // Exercise progress
                Constraint::Min(3),    // Plan
                Constraint::Length(3), // Ratings
                Constraint::Length(3), // Live notes
            ])
            .split(area);

        let state = if draft.timer.is_running() { "running" } else { "paused" };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    draft.timer.formatted(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", state)),
            ]))
            .block(Block::default().title(" Elapsed ").borders(Borders::ALL)),
            chunks[0],
        );

        let summary = draft.summary();
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(Color::Green))
                .label(format!(
                    "{}/{} exercises",
                    summary.completed_exercises, summary.total_exercises
                ))
                .ratio(summary.completion_rate),
            chunks[1],
        );

        let current = draft.current_exercise;
        let items: Vec<ListItem> = draft
            .plan()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let pointer = if i == current { "▶ " } else { "  " };
                ListItem::new(format!(
                    "{}{} {} ({} min)",
                    pointer,
                    checkbox(e.completed),
                    e.name,
                    e.duration
                ))
            })
            .collect();
        let ratings: Vec<Span> = PerformanceMetric::all()
            .iter()
            .enumerate()
            .map(|(i, &metric)| {
                let style = if i == self.metric {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Span::styled(
                    format!(" {} {}/10 ", metric.label(), draft.performance.get(metric)),
                    style,
                )
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title(" Plan ").borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[2], &mut self.list);

        frame.render_widget(
            Paragraph::new(Line::from(ratings))
                .block(Block::default().title(" Client performance ").borders(Borders::ALL)),
            chunks[3],
        );

        let notes_style = if self.editing_live_notes {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(draft.live_notes.clone()).block(
                Block::default()
                    .title(" Live notes ")
                    .borders(Borders::ALL)
                    .border_style(notes_style),
            ),
            chunks[4],
        );
    }

    fn render_post(&mut self, frame: &mut Frame, area: Rect) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let draft = flow.draft();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Notes
                Constraint::Length(3), // Rating + comments
                Constraint::Length(3), // Next session
                Constraint::Min(3),    // Follow-ups
            ])
            .split(area);

        let focus = |field: PostField| {
            if self.post_field == field {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        frame.render_widget(
            Paragraph::new(draft.notes.clone()).block(
                Block::default()
                    .title(" Session notes ")
                    .borders(Borders::ALL)
                    .border_style(focus(PostField::Notes)),
            ),
            chunks[0],
        );

        let stars = match draft.feedback.rating {
            Some(rating) => format!("{}{}", "★".repeat(rating.into()), "☆".repeat((5 - rating).into())),
            None => "☆☆☆☆☆".to_string(),
        };
        frame.render_widget(
            Paragraph::new(format!("{}  {}", stars, draft.feedback.comments)).block(
                Block::default()
                    .title(" Client feedback ")
                    .borders(Borders::ALL)
                    .border_style(focus(PostField::Comments)),
            ),
            chunks[1],
        );

        frame.render_widget(
            Paragraph::new(draft.next_session_plan.clone()).block(
                Block::default()
                    .title(" Next session ")
                    .borders(Borders::ALL)
                    .border_style(focus(PostField::NextPlan)),
            ),
            chunks[2],
        );

        let items: Vec<ListItem> = draft
            .follow_ups
            .iter()
            .map(|item| ListItem::new(format!("{} {}", checkbox(item.checked), item.label)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Follow-up actions ")
                    .borders(Borders::ALL)
                    .border_style(focus(PostField::FollowUps)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, chunks[3], &mut self.list);
    }

    fn render_summary(&self, frame: &mut Frame, area: Rect) {
        let Some(flow) = self.flow.as_ref() else {
            return;
        };
        let draft = flow.draft();
        let summary = draft.summary();
        let mut lines = vec![
            Line::from(format!(
                "Exercises: {}/{} ({:.0}%)",
                summary.completed_exercises,
                summary.total_exercises,
                summary.completion_rate * 100.0
            )),
            Line::from(format!("Duration: {}", format_elapsed(summary.elapsed_secs))),
            Line::from(format!(
                "Rating: {}",
                draft
                    .feedback
                    .rating
                    .map(|r| format!("{}/5", r))
                    .unwrap_or_else(|| "not rated".to_string())
            )),
        ];
        let follow_ups: Vec<&str> = draft
            .follow_ups
            .iter()
            .filter(|f| f.checked)
            .map(|f| f.label.as_str())
            .collect();
        if !follow_ups.is_empty() {
            lines.push(Line::from(format!("Follow-ups: {}", follow_ups.join(", "))));
        }
        if !draft.next_session_plan.is_empty() {
            lines.push(Line::from(format!("Next time: {}", draft.next_session_plan)));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL))
                .wrap(Wrap { trim: true }),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachflow::flow::FlowCallbacks;
    use coachflow::session::{default_checklist, default_follow_ups, Exercise, SessionRecord};

    fn view() -> SessionView {
        let record = SessionRecord {
            id: uuid::Uuid::new_v4(),
            client: "John D.".to_string(),
            service: "Strength Training".to_string(),
            time: "2:00 PM".to_string(),
            location: "Studio A".to_string(),
            price: 75,
            status: Default::default(),
            goals: vec![],
            equipment: vec![],
            notes: String::new(),
            session_plan: vec![Exercise::new("Squats", 10), Exercise::new("Rows", 10)],
        };
        let flow = SessionFlow::new(
            record,
            &default_checklist(),
            &default_follow_ups(),
            SessionStep::PreSession,
            FlowCallbacks::detached(),
        );
        SessionView::new(flow, Duration::from_millis(5))
    }

    fn start(view: &mut SessionView) {
        for _ in 0..default_checklist().len() {
            view.handle_key(KeyCode::Char(' '));
            view.handle_key(KeyCode::Down);
        }
        view.handle_key(KeyCode::Enter);
        assert_eq!(view.step(), Some(SessionStep::DuringSession));
    }

    #[tokio::test]
    async fn test_ticker_follows_timer_state() {
        let mut view = view();
        start(&mut view);
        assert!(view.ticker.is_none());

        view.handle_key(KeyCode::Char('t'));
        assert!(view.ticker.is_some());

        view.handle_key(KeyCode::Char('t'));
        assert!(view.ticker.is_none());
    }

    #[tokio::test]
    async fn test_leaving_during_session_releases_ticker() {
        let mut view = view();
        start(&mut view);
        view.handle_key(KeyCode::Char('t'));
        view.handle_key(KeyCode::Char('c'));
        assert!(view.ticker.is_some());

        view.handle_key(KeyCode::Enter);
        assert_eq!(view.step(), Some(SessionStep::PostSession));
        assert!(view.ticker.is_none());
    }

    #[tokio::test]
    async fn test_pumped_ticks_reach_tracker() {
        let mut view = view();
        start(&mut view);
        view.handle_key(KeyCode::Char('t'));
        tokio::time::sleep(Duration::from_millis(60)).await;
        view.pump_ticks();
        let elapsed = view.flow.as_ref().unwrap().draft().timer.elapsed_secs();
        assert!(elapsed >= 1);
    }

    #[tokio::test]
    async fn test_closed_gate_sets_notice() {
        let mut view = view();
        view.handle_key(KeyCode::Enter);
        assert_eq!(view.step(), Some(SessionStep::PreSession));
        assert!(view.notice.is_some());
    }

    fn press(view: &mut SessionView, code: KeyCode, times: usize) {
        for _ in 0..times {
            view.handle_key(code);
        }
    }

    fn type_text(view: &mut SessionView, text: &str) {
        for c in text.chars() {
            view.handle_key(KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_rating_keys_stop_at_scale_edges() {
        let mut view = view();
        start(&mut view);

        press(&mut view, KeyCode::Left, 8);
        assert_eq!(view.flow.as_ref().unwrap().draft().performance.energy, PerformanceRatings::MIN);
        assert!(view.notice.is_none());
        press(&mut view, KeyCode::Right, 12);
        assert_eq!(view.flow.as_ref().unwrap().draft().performance.energy, PerformanceRatings::MAX);
        assert!(view.notice.is_none());

        view.handle_key(KeyCode::Char('c'));
        view.handle_key(KeyCode::Enter);
        assert_eq!(view.step(), Some(SessionStep::PostSession));

        view.handle_key(KeyCode::Left);
        assert_eq!(view.flow.as_ref().unwrap().draft().feedback.rating, None);
        press(&mut view, KeyCode::Right, 7);
        assert_eq!(view.flow.as_ref().unwrap().draft().feedback.rating, Some(Feedback::MAX_RATING));
        assert!(view.notice.is_none());
        press(&mut view, KeyCode::Left, 7);
        assert_eq!(view.flow.as_ref().unwrap().draft().feedback.rating, Some(Feedback::MIN_RATING));
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_plan_panel_adds_and_removes_exercises() {
        let mut view = view();
        view.handle_key(KeyCode::Tab);
        type_text(&mut view, "Lunges");
        view.handle_key(KeyCode::Enter);

        assert_eq!(view.step(), Some(SessionStep::PreSession));
        let plan = view.flow.as_ref().unwrap().draft().plan().to_vec();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[2].name, "Lunges");
        assert_eq!(plan[2].duration, NEW_EXERCISE_MINUTES);
        assert!(view.exercise_input.is_empty());

        // The new exercise is selected, so Delete takes it back out
        view.handle_key(KeyCode::Delete);
        let plan = view.flow.as_ref().unwrap().draft().plan().to_vec();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].name, "Rows");
        assert_eq!(view.list.selected(), Some(1));

        // With nothing typed, Enter still tries to start the session
        view.handle_key(KeyCode::Enter);
        assert_eq!(view.step(), Some(SessionStep::PreSession));
        assert!(view.notice.is_some());
    }

    #[tokio::test]
    async fn test_notes_panel_edits_prep_notes() {
        let mut view = view();
        press(&mut view, KeyCode::Tab, 2);
        type_text(&mut view, "knee ok");
        view.handle_key(KeyCode::Backspace);

        let draft = view.flow.as_ref().unwrap().draft();
        assert_eq!(draft.prep_notes, "knee o");
        // Space typed into the notes does not tick the checklist
        assert!(draft.checklist.iter().all(|item| !item.checked));
    }

    #[tokio::test]
    async fn test_live_notes_capture_typing() {
        let mut view = view();
        start(&mut view);

        view.handle_key(KeyCode::Char('n'));
        type_text(&mut view, "tcs");
        view.handle_key(KeyCode::Backspace);
        let draft = view.flow.as_ref().unwrap().draft();
        assert_eq!(draft.live_notes, "tc");
        assert!(!draft.timer.is_running());
        assert!(draft.plan().iter().all(|e| !e.completed));

        // Esc leaves the notes, not the step
        view.handle_key(KeyCode::Esc);
        assert_eq!(view.step(), Some(SessionStep::DuringSession));
        view.handle_key(KeyCode::Char('t'));
        assert!(view.ticker.is_some());
    }
}
