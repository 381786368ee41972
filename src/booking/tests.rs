//! Tests for the booking wizard

use super::*;
use crate::catalog::{default_clients, default_services};
use crate::flow::EARLIER_STEPS_INCOMPLETE;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, day).unwrap()
}

fn slot(s: &str) -> TimeSlot {
    s.parse().unwrap()
}

fn context() -> BookingContext {
    let catalog = Arc::new(Catalog::new(default_clients(), default_services()));
    BookingContext::new(catalog, today())
}

fn wizard_at(step: BookingStep) -> BookingWizard {
    BookingWizard::new(step, context(), FlowCallbacks::detached())
}

/// Wizard with client 1 and service 2 chosen, sitting on date/time selection
fn wizard_with_service() -> BookingWizard {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    wizard.select_client(1).unwrap();
    assert!(wizard.next().is_moved());
    wizard.select_service(2).unwrap();
    assert!(wizard.next().is_moved());
    wizard
}

#[test]
fn test_new_wizard_starts_at_initial_step_with_empty_draft() {
    let wizard = wizard_at(BookingStep::ClientSelection);
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
    assert_eq!(wizard.draft(), &BookingDraft::default());
    assert_eq!(wizard.position(), 1);
    assert_eq!(wizard.total_steps(), 5);
    assert!((wizard.progress() - 0.2).abs() < f64::EPSILON);
}

#[test]
fn test_next_blocked_without_client() {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    assert!(!wizard.can_continue());
    assert!(wizard.next().is_blocked());
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
}

#[test]
fn test_search_clients() {
    let wizard = wizard_at(BookingStep::ClientSelection);
    let found: Vec<_> = wizard
        .search_clients("sar")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(found, vec![3]);
}

#[test]
fn test_select_unknown_client() {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    assert_eq!(wizard.select_client(42), Err(FlowError::UnknownClient(42)));
}

#[test]
fn test_select_service_copies_price_duration_equipment() {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    wizard.select_client(1).unwrap();
    wizard.next();
    wizard.select_service(2).unwrap();

    let draft = wizard.draft();
    assert_eq!(draft.price, 65);
    assert_eq!(draft.duration, 75);
    assert_eq!(draft.equipment, vec!["Yoga mat", "Blocks", "Straps"]);
    assert_eq!(draft.service.as_ref().map(|s| s.id), Some(2));
}

#[test]
fn test_select_service_requires_client() {
    let mut wizard = wizard_at(BookingStep::ServiceSelection);
    assert_eq!(wizard.select_service(1), Err(FlowError::ClientRequired));
}

#[test]
fn test_edits_rejected_from_other_steps() {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    let err = wizard.set_notes("hello").unwrap_err();
    assert_eq!(
        err,
        FlowError::StepMismatch {
            expected: "details",
            actual: "client-selection"
        }
    );
    assert!(wizard.select_date(today()).is_err());
    assert!(wizard.draft().notes.is_empty());
}

#[test]
fn test_changing_client_clears_service_date_time() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    assert!(wizard.select_time(slot("10:00")).unwrap());

    wizard.go_to("client-selection").unwrap();
    wizard.select_client(2).unwrap();

    let draft = wizard.draft();
    assert_eq!(draft.client.as_ref().map(|c| c.id), Some(2));
    assert!(draft.service.is_none());
    assert!(draft.date.is_none());
    assert!(draft.time.is_none());
    assert_eq!(draft.price, 0);
    assert_eq!(draft.duration, DEFAULT_DURATION);
}

#[test]
fn test_reselecting_same_client_keeps_draft() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    let before = wizard.draft().clone();

    wizard.go_to("client-selection").unwrap();
    wizard.select_client(1).unwrap();

    assert_eq!(wizard.draft(), &before);
}

#[test]
fn test_datetime_gate_needs_both_date_and_time() {
    let mut wizard = wizard_with_service();
    assert_eq!(wizard.step(), BookingStep::DatetimeSelection);

    wizard.select_date(date(20)).unwrap();
    assert!(wizard.next().is_blocked());
    assert_eq!(wizard.step(), BookingStep::DatetimeSelection);

    wizard.select_time(slot("10:00")).unwrap();
    assert!(wizard.next().is_moved());
    assert_eq!(wizard.step(), BookingStep::Details);
}

#[test]
fn test_changing_date_resets_time() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();

    // Same date keeps the time
    wizard.select_date(date(20)).unwrap();
    assert_eq!(wizard.draft().time, Some(slot("10:00")));

    wizard.select_date(date(21)).unwrap();
    assert_eq!(wizard.draft().time, None);
    assert_eq!(wizard.draft().date, Some(date(21)));
}

#[test]
fn test_date_outside_window_rejected() {
    let mut wizard = wizard_with_service();
    assert_eq!(
        wizard.select_date(date(29)),
        Err(FlowError::DateOutsideWindow(date(29)))
    );
    assert_eq!(wizard.dates().len(), 14);
}

#[test]
fn test_time_requires_date() {
    let mut wizard = wizard_with_service();
    assert_eq!(wizard.select_time(slot("09:00")), Ok(false));
    assert!(wizard.draft().time.is_none());
}

#[test]
fn test_unavailable_slot_is_inert() {
    let blocked = BlockedSlots::parse(&["14:00"]).unwrap();
    let ctx = context().with_availability(Arc::new(blocked));
    let mut wizard = BookingWizard::new(BookingStep::ClientSelection, ctx, FlowCallbacks::detached());
    wizard.select_client(1).unwrap();
    wizard.next();
    wizard.select_service(1).unwrap();
    wizard.next();
    wizard.select_date(date(18)).unwrap();

    assert_eq!(wizard.select_time(slot("14:00")), Ok(false));
    assert!(wizard.draft().time.is_none());

    let unavailable: Vec<_> = wizard
        .time_slots()
        .into_iter()
        .filter(|(_, free)| !free)
        .map(|(slot, _)| slot.to_string())
        .collect();
    assert_eq!(unavailable, vec!["14:00"]);

    // Slots outside the offered list are never available
    assert_eq!(wizard.select_time(slot("07:15")), Ok(false));
}

#[test]
fn test_details_edits() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    wizard.next();

    wizard.set_location(Location::OutdoorPark).unwrap();
    wizard.set_notes("Focus on hips").unwrap();
    wizard.toggle_equipment("Blocks").unwrap();
    wizard.toggle_equipment("Foam roller").unwrap();
    wizard.set_price(90).unwrap();
    wizard.set_duration(60).unwrap();

    let draft = wizard.draft();
    assert_eq!(draft.location, Location::OutdoorPark);
    assert_eq!(draft.notes, "Focus on hips");
    assert_eq!(draft.equipment, vec!["Yoga mat", "Straps", "Foam roller"]);
    assert_eq!(draft.price, 90);
    assert_eq!(draft.duration, 60);
    // Price override leaves the service untouched
    assert_eq!(draft.service.as_ref().map(|s| s.price), Some(65));
    assert!(wizard.can_continue());
}

#[test]
fn test_back_then_next_preserves_step_and_draft() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    wizard.next();
    wizard.set_notes("keep me").unwrap();
    let step = wizard.step();
    let draft = wizard.draft().clone();

    assert!(matches!(wizard.back(), Retreat::Moved { .. }));
    assert!(wizard.next().is_moved());

    assert_eq!(wizard.step(), step);
    assert_eq!(wizard.draft(), &draft);
}

#[test]
fn test_back_from_first_step_cancels() {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let counter = cancelled.clone();
    let mut wizard = BookingWizard::new(
        BookingStep::ClientSelection,
        context(),
        FlowCallbacks::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            |_| {},
        ),
    );

    assert_eq!(wizard.back(), Retreat::Exit);
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
}

#[test]
fn test_go_to_unknown_step() {
    let mut wizard = wizard_at(BookingStep::Details);
    assert_eq!(
        wizard.go_to("payment"),
        Err(FlowError::UnknownStep("payment".to_string()))
    );
}

#[test]
fn test_go_to_forward_requires_earlier_gates() {
    let mut wizard = wizard_at(BookingStep::ClientSelection);
    wizard.select_client(1).unwrap();

    let result = wizard.go_to("confirmation").unwrap();
    assert!(result.is_blocked());
    assert_eq!(wizard.step(), BookingStep::ClientSelection);
}

#[test]
fn test_go_to_confirmation_from_nested_edit_keeps_fields() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    wizard.next();
    wizard.next();
    assert_eq!(wizard.step(), BookingStep::Confirmation);

    // Edit the time two steps back, then return straight to confirmation
    wizard.go_to("datetime-selection").unwrap();
    wizard.select_time(slot("11:00")).unwrap();
    assert!(wizard.go_to("confirmation").unwrap().is_moved());

    assert_eq!(wizard.step(), BookingStep::Confirmation);
    assert_eq!(wizard.draft().time, Some(slot("11:00")));
    assert_eq!(wizard.draft().price, 65);
}

#[test]
fn test_next_at_confirmation_signals_complete() {
    let mut wizard = wizard_with_service();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    wizard.next();
    wizard.next();
    assert_eq!(wizard.next(), Advance::Complete);
    assert_eq!(wizard.gate(), Gate::Terminal);
}

#[test]
fn test_confirm_emits_draft_once() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let mut wizard = BookingWizard::new(
        BookingStep::ClientSelection,
        context(),
        FlowCallbacks::new(|| {}, move |draft: BookingDraft| {
            sink.lock().unwrap().push(draft);
        }),
    );
    wizard.select_client(1).unwrap();
    wizard.next();
    wizard.select_service(2).unwrap();
    wizard.next();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    wizard.next();
    wizard.next();

    assert!(wizard.confirm().is_ok());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].price, 65);
}

#[test]
fn test_confirm_before_confirmation_hands_wizard_back() {
    let wizard = wizard_with_service();
    let wizard = wizard.confirm().unwrap_err();
    assert_eq!(wizard.step(), BookingStep::DatetimeSelection);
}

#[test]
fn test_confirm_resumed_at_confirmation_with_empty_draft_is_inert() {
    let wizard = wizard_at(BookingStep::Confirmation);
    assert!(wizard.confirm().is_err());
}

#[test]
fn test_next_from_resumed_details_needs_earlier_steps() {
    let mut wizard = wizard_at(BookingStep::Details);
    assert!(!wizard.can_continue());
    assert_eq!(
        wizard.next(),
        Advance::Blocked {
            step: BookingStep::Details,
            reason: EARLIER_STEPS_INCOMPLETE,
        }
    );
    assert_eq!(wizard.step(), BookingStep::Details);

    // Filling the earlier steps reopens the way forward
    wizard.go_to("client-selection").unwrap();
    wizard.select_client(1).unwrap();
    wizard.next();
    wizard.select_service(2).unwrap();
    wizard.next();
    wizard.select_date(date(20)).unwrap();
    wizard.select_time(slot("10:00")).unwrap();
    assert!(wizard.go_to("details").unwrap().is_moved());
    assert!(wizard.next().is_moved());
    assert_eq!(wizard.step(), BookingStep::Confirmation);
}

#[test]
fn test_resumed_wizard_handed_back_keeps_its_step() {
    let wizard = wizard_at(BookingStep::Confirmation);
    let wizard = wizard.confirm().unwrap_err();
    assert_eq!(wizard.step(), BookingStep::Confirmation);
    assert!(format!("{wizard:?}").starts_with("BookingWizard"));
}
