//! Entry points a host uses to launch the flows.
//!
//! A host hands a flow its inputs and two callbacks. `on_cancel` runs when the
//! user backs out of the first step; `on_complete` receives the finished record
//! exactly once, from the terminal action.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::booking::{BookingContext, BookingDraft, BookingStep, BookingWizard};
use crate::config::Config;
use crate::flow::FlowCallbacks;
use crate::session::{SessionDraft, SessionFlow, SessionRecord, SessionStep};

/// Open the booking wizard at `initial`
pub fn start_booking_wizard(
    initial: BookingStep,
    ctx: BookingContext,
    on_cancel: impl FnMut() + Send + 'static,
    on_complete: impl FnOnce(BookingDraft) + Send + 'static,
) -> BookingWizard {
    BookingWizard::new(initial, ctx, FlowCallbacks::new(on_cancel, on_complete))
}

/// Start executing `session` at `initial`, with the checklist and follow-up
/// labels taken from `config`
pub fn start_session_flow(
    session: SessionRecord,
    initial: SessionStep,
    config: &Config,
    on_cancel: impl FnMut() + Send + 'static,
    on_complete: impl FnOnce(SessionDraft) + Send + 'static,
) -> SessionFlow {
    SessionFlow::new(
        session,
        &config.session.checklist,
        &config.session.follow_ups,
        initial,
        FlowCallbacks::new(on_cancel, on_complete),
    )
}

/// Booking context for `today` built from the catalog and booking sections
pub fn booking_context(config: &Config, today: NaiveDate) -> Result<BookingContext> {
    let blocked = config.booking.blocked()?;
    Ok(
        BookingContext::new(Arc::new(config.catalog.to_catalog()), today)
            .with_availability(Arc::new(blocked))
            .with_window_days(config.booking.window_days)
            .with_time_slots(config.booking.time_slots.clone())
            .with_equipment_options(config.catalog.equipment.clone()),
    )
}
