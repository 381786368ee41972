//! Shared step-machine machinery for the booking and session flows
//!
//! Each flow declares a closed step enum implementing [`FlowStep`], a draft
//! implementing [`StepGate`], and drives a [`Sequencer`] over them. Hosts get
//! control back through [`FlowCallbacks`].

mod callbacks;
mod gate;
mod sequencer;

pub use callbacks::FlowCallbacks;
pub use gate::{Gate, StepGate, EARLIER_STEPS_INCOMPLETE};
pub use sequencer::{Advance, FlowStep, Retreat, Sequencer};
