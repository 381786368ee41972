//! Booking steps, the booking draft and its gates

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::availability::TimeSlot;
use crate::catalog::{Client, Service};
use crate::flow::{FlowStep, Gate, StepGate};

/// Steps of the booking wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStep {
    ClientSelection,
    ServiceSelection,
    DatetimeSelection,
    Details,
    Confirmation,
}

impl FlowStep for BookingStep {
    const FLOW: &'static str = "booking";
    const ORDER: &'static [Self] = &[
        BookingStep::ClientSelection,
        BookingStep::ServiceSelection,
        BookingStep::DatetimeSelection,
        BookingStep::Details,
        BookingStep::Confirmation,
    ];

    fn name(self) -> &'static str {
        match self {
            BookingStep::ClientSelection => "client-selection",
            BookingStep::ServiceSelection => "service-selection",
            BookingStep::DatetimeSelection => "datetime-selection",
            BookingStep::Details => "details",
            BookingStep::Confirmation => "confirmation",
        }
    }
}

impl BookingStep {
    /// Screen title
    pub fn title(&self) -> &'static str {
        match self {
            BookingStep::ClientSelection => "Select Client",
            BookingStep::ServiceSelection => "Select Service",
            BookingStep::DatetimeSelection => "Date & Time",
            BookingStep::Details => "Session Details",
            BookingStep::Confirmation => "Confirm Session",
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a booked session takes place
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[default]
    #[serde(rename = "Studio A")]
    StudioA,
    #[serde(rename = "Studio B")]
    StudioB,
    #[serde(rename = "Gym - Weight Room")]
    GymWeightRoom,
    #[serde(rename = "Gym - Cardio Area")]
    GymCardioArea,
    #[serde(rename = "Outdoor Park")]
    OutdoorPark,
    #[serde(rename = "Client's Home")]
    ClientsHome,
    #[serde(rename = "Virtual Session")]
    Virtual,
}

impl Location {
    pub fn all() -> &'static [Location] {
        &[
            Location::StudioA,
            Location::StudioB,
            Location::GymWeightRoom,
            Location::GymCardioArea,
            Location::OutdoorPark,
            Location::ClientsHome,
            Location::Virtual,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Location::StudioA => "Studio A",
            Location::StudioB => "Studio B",
            Location::GymWeightRoom => "Gym - Weight Room",
            Location::GymCardioArea => "Gym - Cardio Area",
            Location::OutdoorPark => "Outdoor Park",
            Location::ClientsHome => "Client's Home",
            Location::Virtual => "Virtual Session",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::all()
            .iter()
            .copied()
            .find(|loc| loc.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown location: {s}"))
    }
}

/// Default session length before a service is chosen, in minutes
pub const DEFAULT_DURATION: u32 = 60;

/// The booking being assembled across wizard steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub client: Option<Client>,
    pub service: Option<Service>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    /// Minutes, copied from the service and editable afterwards
    pub duration: u32,
    /// Copied from the service and editable afterwards
    pub price: u32,
    pub location: Location,
    pub notes: String,
    pub equipment: Vec<String>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            client: None,
            service: None,
            date: None,
            time: None,
            duration: DEFAULT_DURATION,
            price: 0,
            location: Location::default(),
            notes: String::new(),
            equipment: Vec::new(),
        }
    }
}

/// Partial update merged into a [`BookingDraft`]; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    pub client: Option<Client>,
    pub service: Option<Service>,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeSlot>,
    pub duration: Option<u32>,
    pub price: Option<u32>,
    pub location: Option<Location>,
    pub notes: Option<String>,
    pub equipment: Option<Vec<String>>,
}

impl BookingDraft {
    /// Merge a partial update without touching fields it leaves unset
    pub fn merge(&mut self, patch: BookingPatch) {
        let BookingPatch {
            client,
            service,
            date,
            time,
            duration,
            price,
            location,
            notes,
            equipment,
        } = patch;

        if client.is_some() {
            self.client = client;
        }
        if service.is_some() {
            self.service = service;
        }
        if date.is_some() {
            self.date = date;
        }
        if time.is_some() {
            self.time = time;
        }
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        if let Some(equipment) = equipment {
            self.equipment = equipment;
        }
    }

    /// Drop everything derived from a previous client's choices
    pub(crate) fn clear_selection(&mut self) {
        let defaults = Self::default();
        self.service = None;
        self.date = None;
        self.time = None;
        self.duration = defaults.duration;
        self.price = defaults.price;
        self.equipment = defaults.equipment;
    }

    /// Toggle an equipment label in or out of the set
    pub(crate) fn toggle_equipment(&mut self, item: &str) {
        if self.equipment.iter().any(|e| e == item) {
            self.equipment.retain(|e| e != item);
        } else {
            self.equipment.push(item.to_string());
        }
    }

    /// All fields the confirmation step requires are present
    pub fn is_confirmable(&self) -> bool {
        self.client.is_some() && self.service.is_some() && self.date.is_some() && self.time.is_some()
    }
}

impl StepGate<BookingStep> for BookingDraft {
    fn gate(&self, step: BookingStep) -> Gate {
        match step {
            BookingStep::ClientSelection if self.client.is_none() => {
                Gate::Closed("Select a client to continue")
            }
            BookingStep::ServiceSelection if self.service.is_none() => {
                Gate::Closed("Select a service to continue")
            }
            BookingStep::DatetimeSelection if self.date.is_none() || self.time.is_none() => {
                Gate::Closed("Pick both a date and a time")
            }
            BookingStep::ClientSelection
            | BookingStep::ServiceSelection
            | BookingStep::DatetimeSelection
            | BookingStep::Details => Gate::Open,
            BookingStep::Confirmation => Gate::Terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_clients, default_services};

    #[test]
    fn test_step_names_round_trip() {
        for step in BookingStep::ORDER {
            assert_eq!(BookingStep::from_name(step.name()), Ok(*step));
        }
        assert!(BookingStep::from_name("payment").is_err());
    }

    #[test]
    fn test_step_serde_uses_kebab_case() {
        let json = serde_json::to_string(&BookingStep::DatetimeSelection).unwrap();
        assert_eq!(json, "\"datetime-selection\"");
    }

    #[test]
    fn test_location_labels() {
        assert_eq!(Location::default(), Location::StudioA);
        assert_eq!("client's home".parse::<Location>(), Ok(Location::ClientsHome));
        assert!("Moon".parse::<Location>().is_err());
        assert_eq!(
            serde_json::to_string(&Location::GymCardioArea).unwrap(),
            "\"Gym - Cardio Area\""
        );
    }

    #[test]
    fn test_merge_is_non_destructive() {
        let mut draft = BookingDraft {
            notes: "bring water".to_string(),
            ..Default::default()
        };

        draft.merge(BookingPatch {
            price: Some(80),
            ..Default::default()
        });

        assert_eq!(draft.price, 80);
        assert_eq!(draft.notes, "bring water");
        assert_eq!(draft.duration, DEFAULT_DURATION);
    }

    #[test]
    fn test_gates() {
        let mut draft = BookingDraft::default();
        assert!(!draft.gate(BookingStep::ClientSelection).is_open());
        assert!(draft.gate(BookingStep::Details).is_open());
        assert_eq!(draft.gate(BookingStep::Confirmation), Gate::Terminal);

        draft.client = default_clients().into_iter().next();
        assert!(draft.gate(BookingStep::ClientSelection).is_open());

        draft.service = default_services().into_iter().next();
        assert!(draft.gate(BookingStep::ServiceSelection).is_open());

        draft.date = NaiveDate::from_ymd_opt(2024, 11, 20);
        assert!(!draft.gate(BookingStep::DatetimeSelection).is_open());

        draft.time = "10:00".parse().ok();
        assert!(draft.gate(BookingStep::DatetimeSelection).is_open());
        assert!(draft.is_confirmable());
    }

    #[test]
    fn test_toggle_equipment() {
        let mut draft = BookingDraft::default();
        draft.toggle_equipment("Bench");
        draft.toggle_equipment("Kettlebells");
        assert_eq!(draft.equipment, vec!["Bench", "Kettlebells"]);
        draft.toggle_equipment("Bench");
        assert_eq!(draft.equipment, vec!["Kettlebells"]);
    }
}
