//! Booking wizard: client → service → date/time → details → confirmation

mod availability;
mod draft;

pub use availability::{
    default_time_slots, AlwaysAvailable, BlockedSlots, DateWindow, SlotAvailability, TimeSlot,
};
pub use draft::{BookingDraft, BookingPatch, BookingStep, Location, DEFAULT_DURATION};

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Client, Service};
use crate::error::{FlowError, Result};
use crate::flow::{Advance, FlowCallbacks, FlowStep, Gate, Retreat, Sequencer, StepGate};

/// Host-supplied collaborators for a booking wizard
#[derive(Clone)]
pub struct BookingContext {
    pub catalog: Arc<Catalog>,
    pub availability: Arc<dyn SlotAvailability>,
    pub window: DateWindow,
    pub time_slots: Vec<TimeSlot>,
    /// Equipment offered on the details step
    pub equipment_options: Vec<String>,
}

impl BookingContext {
    /// Context with every slot available and a two-week window from `today`
    pub fn new(catalog: Arc<Catalog>, today: NaiveDate) -> Self {
        Self {
            catalog,
            availability: Arc::new(AlwaysAvailable),
            window: DateWindow::starting(today),
            time_slots: default_time_slots(),
            equipment_options: crate::catalog::default_equipment(),
        }
    }

    pub fn with_availability(mut self, availability: Arc<dyn SlotAvailability>) -> Self {
        self.availability = availability;
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window = DateWindow::new(self.window.start(), days);
        self
    }

    pub fn with_time_slots(mut self, time_slots: Vec<TimeSlot>) -> Self {
        self.time_slots = time_slots;
        self
    }

    pub fn with_equipment_options(mut self, options: Vec<String>) -> Self {
        self.equipment_options = options;
        self
    }
}

/// Drives a [`BookingDraft`] through the booking steps.
///
/// Each mutator belongs to exactly one step and rejects calls from any other
/// step with [`FlowError::StepMismatch`].
pub struct BookingWizard {
    seq: Sequencer<BookingStep>,
    draft: BookingDraft,
    ctx: BookingContext,
    callbacks: FlowCallbacks<BookingDraft>,
}

impl fmt::Debug for BookingWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingWizard")
            .field("step", &self.step())
            .field("draft", &self.draft)
            .field("window", &self.ctx.window)
            .finish_non_exhaustive()
    }
}

impl BookingWizard {
    /// Open the wizard at `initial` with an empty draft
    pub fn new(
        initial: BookingStep,
        ctx: BookingContext,
        callbacks: FlowCallbacks<BookingDraft>,
    ) -> Self {
        debug!(step = initial.name(), "booking wizard opened");
        Self {
            seq: Sequencer::new(initial),
            draft: BookingDraft::default(),
            ctx,
            callbacks,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.seq.current()
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn context(&self) -> &BookingContext {
        &self.ctx
    }

    /// 1-based step number
    pub fn position(&self) -> usize {
        self.seq.position()
    }

    pub fn total_steps(&self) -> usize {
        self.seq.total()
    }

    pub fn progress(&self) -> f64 {
        self.seq.progress()
    }

    /// Gate for the current step, also closed while an earlier step is unfinished
    pub fn gate(&self) -> Gate {
        self.draft.forward_gate(self.step())
    }

    /// Whether "Continue" is enabled
    pub fn can_continue(&self) -> bool {
        self.gate().is_open()
    }

    fn require(&self, expected: BookingStep) -> Result<()> {
        let actual = self.step();
        if actual == expected {
            Ok(())
        } else {
            warn!(expected = expected.name(), actual = actual.name(), "booking edit from wrong step");
            Err(FlowError::StepMismatch {
                expected: expected.name(),
                actual: actual.name(),
            })
        }
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    /// Continue to the next step if the current gate is open
    pub fn next(&mut self) -> Advance<BookingStep> {
        let gate = self.gate();
        self.seq.advance(gate)
    }

    /// Go back one step. Backing out of the first step cancels the wizard.
    pub fn back(&mut self) -> Retreat<BookingStep> {
        let result = self.seq.retreat();
        if result == Retreat::Exit {
            info!("booking wizard cancelled");
            self.callbacks.cancel();
        }
        result
    }

    /// Jump to a named step without clearing any draft fields
    pub fn go_to(&mut self, name: &str) -> Result<Advance<BookingStep>> {
        let target = BookingStep::from_name(name)?;
        let reachable = self.draft.can_reach(target);
        Ok(self.seq.jump(target, reachable))
    }

    /// Emit the finished draft to the host.
    ///
    /// Only succeeds on the confirmation step with client, service, date and
    /// time all set; otherwise the wizard is handed back untouched.
    #[allow(clippy::result_large_err)]
    pub fn confirm(self) -> std::result::Result<(), Self> {
        if self.step() != BookingStep::Confirmation || !self.draft.is_confirmable() {
            debug!(step = self.step().name(), "confirm ignored");
            return Err(self);
        }

        let Self {
            draft, callbacks, ..
        } = self;
        info!(
            client = draft.client.as_ref().map(|c| c.name.as_str()),
            service = draft.service.as_ref().map(|s| s.name.as_str()),
            date = ?draft.date,
            time = ?draft.time,
            "booking confirmed"
        );
        callbacks.complete(draft);
        Ok(())
    }

    // ─── Client selection ───────────────────────────────────────────────────

    /// Clients matching a search query
    pub fn search_clients(&self, query: &str) -> Vec<&Client> {
        self.ctx.catalog.filter_clients(query)
    }

    /// Choose a client. Switching to a different client clears the service,
    /// date and time chosen for the previous one.
    pub fn select_client(&mut self, client_id: u32) -> Result<()> {
        self.require(BookingStep::ClientSelection)?;
        let client = self
            .ctx
            .catalog
            .client(client_id)
            .cloned()
            .ok_or(FlowError::UnknownClient(client_id))?;

        if self.draft.client.as_ref().map(|c| c.id) == Some(client.id) {
            return Ok(());
        }
        if self.draft.client.is_some() {
            debug!(client = %client.name, "client changed, clearing selection");
            self.draft.clear_selection();
        }
        self.draft.merge(BookingPatch {
            client: Some(client),
            ..Default::default()
        });
        Ok(())
    }

    // ─── Service selection ──────────────────────────────────────────────────

    pub fn services(&self) -> &[Service] {
        &self.ctx.catalog.services
    }

    /// Choose a service, copying its price, duration and equipment onto the draft
    pub fn select_service(&mut self, service_id: u32) -> Result<()> {
        self.require(BookingStep::ServiceSelection)?;
        if self.draft.client.is_none() {
            return Err(FlowError::ClientRequired);
        }
        let service = self
            .ctx
            .catalog
            .service(service_id)
            .cloned()
            .ok_or(FlowError::UnknownService(service_id))?;

        self.draft.merge(BookingPatch {
            price: Some(service.price),
            duration: Some(service.duration),
            equipment: Some(service.equipment.clone()),
            service: Some(service),
            ..Default::default()
        });
        Ok(())
    }

    // ─── Date & time selection ──────────────────────────────────────────────

    /// Bookable dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.ctx.window.dates()
    }

    /// Offered slots for the selected date, paired with their availability
    pub fn time_slots(&self) -> Vec<(TimeSlot, bool)> {
        self.ctx
            .time_slots
            .iter()
            .map(|&slot| (slot, self.is_slot_available(slot)))
            .collect()
    }

    /// Whether `time` can be picked for the selected date
    pub fn is_slot_available(&self, time: TimeSlot) -> bool {
        match self.draft.date {
            Some(date) => {
                self.ctx.time_slots.contains(&time)
                    && self.ctx.availability.is_slot_available(date, time)
            }
            None => false,
        }
    }

    /// Choose a date. Changing the date drops the previously chosen time.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        self.require(BookingStep::DatetimeSelection)?;
        if !self.ctx.window.contains(date) {
            return Err(FlowError::DateOutsideWindow(date));
        }
        if self.draft.date != Some(date) {
            self.draft.time = None;
            self.draft.merge(BookingPatch {
                date: Some(date),
                ..Default::default()
            });
        }
        Ok(())
    }

    /// Choose a time slot. Returns `false` (and changes nothing) when no date
    /// is chosen yet or the slot is unavailable.
    pub fn select_time(&mut self, time: TimeSlot) -> Result<bool> {
        self.require(BookingStep::DatetimeSelection)?;
        if !self.is_slot_available(time) {
            debug!(time = %time, "slot unavailable");
            return Ok(false);
        }
        self.draft.merge(BookingPatch {
            time: Some(time),
            ..Default::default()
        });
        Ok(true)
    }

    // ─── Details ────────────────────────────────────────────────────────────

    pub fn equipment_options(&self) -> &[String] {
        &self.ctx.equipment_options
    }

    pub fn set_location(&mut self, location: Location) -> Result<()> {
        self.require(BookingStep::Details)?;
        self.draft.merge(BookingPatch {
            location: Some(location),
            ..Default::default()
        });
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        self.require(BookingStep::Details)?;
        self.draft.merge(BookingPatch {
            notes: Some(notes.into()),
            ..Default::default()
        });
        Ok(())
    }

    pub fn toggle_equipment(&mut self, item: &str) -> Result<()> {
        self.require(BookingStep::Details)?;
        self.draft.toggle_equipment(item);
        Ok(())
    }

    /// Override the price copied from the service. The service itself is untouched.
    pub fn set_price(&mut self, price: u32) -> Result<()> {
        self.require(BookingStep::Details)?;
        self.draft.merge(BookingPatch {
            price: Some(price),
            ..Default::default()
        });
        Ok(())
    }

    /// Override the duration copied from the service
    pub fn set_duration(&mut self, minutes: u32) -> Result<()> {
        self.require(BookingStep::Details)?;
        self.draft.merge(BookingPatch {
            duration: Some(minutes),
            ..Default::default()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests;
