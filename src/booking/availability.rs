//! Bookable dates, time slots and the availability seam
//!
//! The wizard never decides availability itself; it asks a [`SlotAvailability`]
//! supplied by the host. [`BlockedSlots`] is the config-driven stand-in used
//! when no scheduling backend is plugged in.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A time of day, formatted as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .map_err(|e| format!("Invalid time '{s}': {e}"))
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Hourly slots from 08:00 to 20:00
pub fn default_time_slots() -> Vec<TimeSlot> {
    (8..=20).filter_map(|hour| TimeSlot::new(hour, 0)).collect()
}

/// Rolling window of bookable dates starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    days: u32,
}

impl DateWindow {
    pub const DEFAULT_DAYS: u32 = 14;

    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    /// Default two-week window starting at `today`
    pub fn starting(today: NaiveDate) -> Self {
        Self::new(today, Self::DEFAULT_DAYS)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let offset = (date - self.start).num_days();
        offset >= 0 && offset < i64::from(self.days)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.days)
            .map(|offset| self.start + Duration::days(i64::from(offset)))
            .collect()
    }
}

/// Decides whether a slot can be booked. This is where a scheduling backend plugs in.
pub trait SlotAvailability: Send + Sync {
    fn is_slot_available(&self, date: NaiveDate, time: TimeSlot) -> bool;
}

impl<F> SlotAvailability for F
where
    F: Fn(NaiveDate, TimeSlot) -> bool + Send + Sync,
{
    fn is_slot_available(&self, date: NaiveDate, time: TimeSlot) -> bool {
        self(date, time)
    }
}

/// Every slot is free
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl SlotAvailability for AlwaysAvailable {
    fn is_slot_available(&self, _date: NaiveDate, _time: TimeSlot) -> bool {
        true
    }
}

/// Blacklist of slots, either blocked every day or on one date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedSlots {
    daily: HashSet<TimeSlot>,
    dated: HashSet<(NaiveDate, TimeSlot)>,
}

impl BlockedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_daily(mut self, time: TimeSlot) -> Self {
        self.daily.insert(time);
        self
    }

    pub fn block_on(mut self, date: NaiveDate, time: TimeSlot) -> Self {
        self.dated.insert((date, time));
        self
    }

    /// Parse entries of the form `HH:MM` (every day) or `YYYY-MM-DD HH:MM`
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, String> {
        entries.iter().try_fold(Self::new(), |blocked, entry| {
            let entry = entry.as_ref().trim();
            match entry.split_once(' ') {
                Some((date, time)) => {
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|e| format!("Invalid date in blocked slot '{entry}': {e}"))?;
                    Ok(blocked.block_on(date, time.parse()?))
                }
                None => Ok(blocked.block_daily(entry.parse()?)),
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.dated.is_empty()
    }
}

impl SlotAvailability for BlockedSlots {
    fn is_slot_available(&self, date: NaiveDate, time: TimeSlot) -> bool {
        !self.daily.contains(&time) && !self.dated.contains(&(date, time))
    }
}
