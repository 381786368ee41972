//! coachflow - session booking and execution flows for personal trainers
//!
//! The two flows are step machines over an owned draft: [`booking::BookingWizard`]
//! assembles a booking, [`session::SessionFlow`] runs a scheduled session from
//! preparation to summary. Hosts launch them through [`host`] and get the
//! finished record back through a callback.

pub mod booking;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod host;
pub mod logging;
pub mod session;

pub use error::{FlowError, Result};
