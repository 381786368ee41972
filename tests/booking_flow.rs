//! Integration tests for the booking wizard, driven through the host entry points
//!
//! ```bash
//! cargo test --test booking_flow
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use coachflow::booking::{BookingDraft, BookingStep, BookingWizard, Location, TimeSlot};
use coachflow::config::Config;
use coachflow::flow::{Advance, Retreat, EARLIER_STEPS_INCOMPLETE};
use coachflow::host;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
}

fn slot(hour: u32) -> TimeSlot {
    TimeSlot::new(hour, 0).unwrap()
}

struct Harness {
    wizard: BookingWizard,
    cancels: Arc<AtomicUsize>,
    emitted: Arc<Mutex<Vec<BookingDraft>>>,
}

fn open(initial: BookingStep) -> Harness {
    let ctx = host::booking_context(&Config::default(), today()).unwrap();
    let cancels = Arc::new(AtomicUsize::new(0));
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c = cancels.clone();
    let e = emitted.clone();
    let wizard = host::start_booking_wizard(
        initial,
        ctx,
        move || {
            c.fetch_add(1, Ordering::SeqCst);
        },
        move |draft| e.lock().unwrap().push(draft),
    );
    Harness {
        wizard,
        cancels,
        emitted,
    }
}

fn client_id(wizard: &BookingWizard, name: &str) -> u32 {
    wizard.search_clients(name)[0].id
}

fn service_id(wizard: &BookingWizard, name: &str) -> u32 {
    wizard
        .services()
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.id)
        .unwrap()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn test_happy_path_books_yoga_with_emma() {
    let Harness {
        mut wizard,
        cancels,
        emitted,
    } = open(BookingStep::ClientSelection);

    // Continue is disabled until a client is chosen
    assert!(!wizard.can_continue());
    assert!(wizard.next().is_blocked());

    let emma = client_id(&wizard, "emma");
    wizard.select_client(emma).unwrap();
    assert!(wizard.next().is_moved());

    let yoga = service_id(&wizard, "Yoga Session");
    wizard.select_service(yoga).unwrap();
    assert_eq!(wizard.draft().price, 65);
    assert_eq!(wizard.draft().duration, 75);
    assert!(wizard.next().is_moved());

    let date = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
    wizard.select_date(date).unwrap();
    // Date alone does not open the gate
    assert!(wizard.next().is_blocked());
    assert_eq!(wizard.step(), BookingStep::DatetimeSelection);
    assert!(wizard.select_time(slot(10)).unwrap());
    assert!(wizard.next().is_moved());

    assert_eq!(wizard.step(), BookingStep::Details);
    assert!(wizard.next().is_moved());
    assert_eq!(wizard.step(), BookingStep::Confirmation);
    assert_eq!(wizard.progress(), 1.0);
    assert_eq!(wizard.next(), Advance::Complete);

    assert!(wizard.confirm().is_ok());

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted.len(), 1);
    let draft = &emitted[0];
    assert_eq!(draft.client.as_ref().unwrap().name, "Emma L.");
    assert_eq!(draft.service.as_ref().unwrap().name, "Yoga Session");
    assert_eq!(draft.date, Some(date));
    assert_eq!(draft.time, Some(slot(10)));
    assert_eq!(draft.price, 65);
    assert_eq!(draft.duration, 75);
    assert_eq!(draft.location, Location::StudioA);
    assert_eq!(draft.equipment, vec!["Yoga mat", "Blocks", "Straps"]);
    assert_eq!(cancels.load(Ordering::SeqCst), 0);
}

#[test]
fn test_switching_client_clears_service_and_schedule() {
    let Harness { mut wizard, .. } = open(BookingStep::ClientSelection);

    wizard.select_client(client_id(&wizard, "John")).unwrap();
    wizard.next();
    wizard.select_service(service_id(&wizard, "HIIT Training")).unwrap();
    wizard.next();
    wizard
        .select_date(NaiveDate::from_ymd_opt(2024, 11, 18).unwrap())
        .unwrap();
    assert!(wizard.select_time(slot(9)).unwrap());

    assert!(wizard.go_to("client-selection").unwrap().is_moved());
    wizard.select_client(client_id(&wizard, "Sarah")).unwrap();

    let draft = wizard.draft();
    assert_eq!(draft.client.as_ref().unwrap().name, "Sarah K.");
    assert!(draft.service.is_none());
    assert!(draft.date.is_none());
    assert!(draft.time.is_none());

    // Nothing downstream is reachable any more
    assert!(wizard.go_to("confirmation").unwrap().is_blocked());
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
}

#[test]
fn test_edit_from_confirmation_keeps_draft() {
    let Harness {
        mut wizard,
        emitted,
        ..
    } = open(BookingStep::ClientSelection);

    wizard.select_client(client_id(&wizard, "Lisa")).unwrap();
    wizard.next();
    wizard.select_service(service_id(&wizard, "Pilates")).unwrap();
    wizard.next();
    wizard
        .select_date(NaiveDate::from_ymd_opt(2024, 11, 22).unwrap())
        .unwrap();
    wizard.select_time(slot(14)).unwrap();
    wizard.next();
    wizard.next();
    assert_eq!(wizard.step(), BookingStep::Confirmation);

    // Edit the details, then jump straight back to confirmation
    assert!(wizard.go_to("details").unwrap().is_moved());
    wizard.set_location(Location::OutdoorPark).unwrap();
    wizard.set_notes("Bring water").unwrap();
    assert!(wizard.go_to("confirmation").unwrap().is_moved());

    // Details edits are rejected outside their step
    assert!(wizard.set_notes("late edit").is_err());

    assert!(wizard.confirm().is_ok());
    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted[0].location, Location::OutdoorPark);
    assert_eq!(emitted[0].notes, "Bring water");
    assert_eq!(emitted[0].service.as_ref().unwrap().name, "Pilates");
}

#[test]
fn test_back_then_next_keeps_entries() {
    let Harness { mut wizard, .. } = open(BookingStep::ClientSelection);

    wizard.select_client(client_id(&wizard, "Emma")).unwrap();
    wizard.next();
    wizard.select_service(service_id(&wizard, "Yoga Session")).unwrap();
    wizard.next();
    let before = wizard.draft().clone();

    assert!(matches!(wizard.back(), Retreat::Moved { .. }));
    assert!(wizard.next().is_moved());
    assert_eq!(wizard.step(), BookingStep::DatetimeSelection);
    assert_eq!(wizard.draft(), &before);

    // Re-selecting the same client is a no-op
    wizard.go_to("client-selection").unwrap();
    wizard.select_client(client_id(&wizard, "Emma")).unwrap();
    assert_eq!(wizard.draft(), &before);
}

#[test]
fn test_back_from_first_step_cancels() {
    let Harness {
        mut wizard,
        cancels,
        emitted,
    } = open(BookingStep::ClientSelection);

    wizard.select_client(client_id(&wizard, "Mike")).unwrap();
    wizard.next();
    assert!(matches!(wizard.back(), Retreat::Moved { .. }));
    assert_eq!(wizard.back(), Retreat::Exit);
    assert_eq!(cancels.load(Ordering::SeqCst), 1);

    // Confirm is refused away from the last step
    let wizard = wizard.confirm().unwrap_err();
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
    assert!(emitted.lock().unwrap().is_empty());
}

#[test]
fn test_dates_outside_window_are_rejected() {
    let Harness { mut wizard, .. } = open(BookingStep::DatetimeSelection);

    assert_eq!(wizard.dates().len(), 14);
    assert_eq!(wizard.dates()[0], today());
    let too_late = NaiveDate::from_ymd_opt(2024, 11, 29).unwrap();
    assert!(wizard.select_date(too_late).is_err());
    assert!(wizard.draft().date.is_none());

    // No date picked yet, so every slot reads unavailable
    assert!(!wizard.select_time(slot(10)).unwrap());
}

#[test]
fn test_resumed_wizard_cannot_skip_its_gates() {
    let Harness { mut wizard, .. } = open(BookingStep::Details);

    assert!(!wizard.can_continue());
    assert_eq!(
        wizard.next(),
        Advance::Blocked {
            step: BookingStep::Details,
            reason: EARLIER_STEPS_INCOMPLETE,
        }
    );
    assert_eq!(wizard.step(), BookingStep::Details);

    let Harness { wizard, emitted, .. } = open(BookingStep::Confirmation);
    let wizard = wizard.confirm().unwrap_err();
    assert_eq!(wizard.step(), BookingStep::Confirmation);
    assert!(emitted.lock().unwrap().is_empty());
}
