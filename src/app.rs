use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;

use coachflow::booking::{BookingDraft, BookingStep};
use coachflow::config::Config;
use coachflow::host;
use coachflow::session::{SessionDraft, SessionStatus, SessionStep};

use crate::ui::{install_panic_hook, BookingView, Dashboard, SessionView, TerminalGuard};

/// What a flow reports back through its host callbacks
#[derive(Debug)]
enum FlowEvent {
    BookingCancelled,
    BookingConfirmed(BookingDraft),
    SessionCancelled,
    SessionCompleted(Box<SessionDraft>),
}

/// Screen currently on top of the dashboard
enum Overlay {
    None,
    Booking(BookingView),
    Session(SessionView),
}

pub struct App {
    config: Config,
    dashboard: Dashboard,
    overlay: Overlay,
    events_tx: mpsc::UnboundedSender<FlowEvent>,
    events_rx: mpsc::UnboundedReceiver<FlowEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        // Surface bad blocked-slot entries before the terminal is taken over
        config.booking.blocked()?;

        let dashboard = Dashboard::new(config.session.sessions.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            dashboard,
            overlay: Overlay::None,
            events_tx,
            events_rx,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let mut guard = TerminalGuard::new()?;

        let tick_rate = self.config.refresh_rate();

        while !self.should_quit {
            if let Overlay::Session(view) = &mut self.overlay {
                view.pump_ticks();
            }

            guard
                .terminal()
                .draw(|f| {
                    self.dashboard.render(f);
                    match &mut self.overlay {
                        Overlay::Booking(view) => view.render(f),
                        Overlay::Session(view) => view.render(f),
                        Overlay::None => {}
                    }
                })
                .context("Failed to draw frame")?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }

            self.drain_flow_events();
        }

        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match &mut self.overlay {
            Overlay::Booking(view) => view.handle_key(code),
            Overlay::Session(view) => view.handle_key(code),
            Overlay::None => match code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Up => self.dashboard.move_selection(false),
                KeyCode::Down => self.dashboard.move_selection(true),
                KeyCode::Char('a') => self.open_booking()?,
                KeyCode::Enter => self.open_session(),
                _ => {}
            },
        }
        Ok(())
    }

    fn open_booking(&mut self) -> Result<()> {
        let today = chrono::Local::now().date_naive();
        let ctx = host::booking_context(&self.config, today)?;
        let cancel_tx = self.events_tx.clone();
        let complete_tx = self.events_tx.clone();
        let wizard = host::start_booking_wizard(
            BookingStep::ClientSelection,
            ctx,
            move || {
                let _ = cancel_tx.send(FlowEvent::BookingCancelled);
            },
            move |draft| {
                let _ = complete_tx.send(FlowEvent::BookingConfirmed(draft));
            },
        );
        self.overlay = Overlay::Booking(BookingView::new(wizard));
        Ok(())
    }

    fn open_session(&mut self) {
        let Some(session) = self.dashboard.selected_session().cloned() else {
            return;
        };
        if session.status == SessionStatus::Completed {
            self.dashboard
                .set_status(format!("Session with {} is already completed", session.client));
            return;
        }
        let cancel_tx = self.events_tx.clone();
        let complete_tx = self.events_tx.clone();
        let flow = host::start_session_flow(
            session,
            SessionStep::Details,
            &self.config,
            move || {
                let _ = cancel_tx.send(FlowEvent::SessionCancelled);
            },
            move |draft| {
                let _ = complete_tx.send(FlowEvent::SessionCompleted(Box::new(draft)));
            },
        );
        self.overlay = Overlay::Session(SessionView::new(flow, self.config.session.tick_interval()));
    }

    /// Apply callback results; any flow exit closes its overlay
    fn drain_flow_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            tracing::debug!(?event, "flow event");
            match event {
                FlowEvent::BookingCancelled => self.dashboard.set_status("Booking cancelled"),
                FlowEvent::BookingConfirmed(draft) => self.dashboard.add_booking(draft),
                FlowEvent::SessionCancelled => self.dashboard.set_status("Session closed"),
                FlowEvent::SessionCompleted(draft) => self.dashboard.complete_session(*draft),
            }
            // Dropping a session view drops its ticker
            self.overlay = Overlay::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    #[test]
    fn test_q_quits_from_dashboard() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q')).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_booking_cancel_closes_overlay() {
        let mut app = app();
        app.handle_key(KeyCode::Char('a')).unwrap();
        assert!(matches!(app.overlay, Overlay::Booking(_)));

        // Esc on the first step backs out of the wizard
        app.handle_key(KeyCode::Esc).unwrap();
        app.drain_flow_events();
        assert!(matches!(app.overlay, Overlay::None));
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_session_cancel_closes_overlay() {
        let mut app = app();
        // first demo session is already completed
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.overlay, Overlay::None));

        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.overlay, Overlay::Session(_)));

        app.handle_key(KeyCode::Esc).unwrap();
        app.drain_flow_events();
        assert!(matches!(app.overlay, Overlay::None));
    }
}
