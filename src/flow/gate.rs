//! Per-step forward gates

use super::sequencer::FlowStep;

/// Reason shown when a step is entered with earlier gates still closed
pub const EARLIER_STEPS_INCOMPLETE: &str = "Earlier steps are incomplete";

/// Result of evaluating a step's gate against the current draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Continue is enabled
    Open,
    /// Continue is disabled; the reason is shown next to the inert control
    Closed(&'static str),
    /// Last step: forward progress happens through the terminal action
    Terminal,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        matches!(self, Gate::Open)
    }

    /// Reason text for a closed gate
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Gate::Closed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Table of gates for a flow, implemented by the flow's draft.
///
/// Implementations must be pure: the same draft always yields the same gate.
pub trait StepGate<S: FlowStep> {
    /// Gate for leaving `step` forwards
    fn gate(&self, step: S) -> Gate;

    /// Whether every step before `target` has an open gate
    fn can_reach(&self, target: S) -> bool {
        S::ORDER
            .iter()
            .take_while(|&&step| step != target)
            .all(|&step| self.gate(step).is_open())
    }

    /// Gate for leaving `step` forwards, closed while any earlier gate is
    /// closed. Flows resumed mid-way go through this, so they cannot skip
    /// the steps they never visited.
    fn forward_gate(&self, step: S) -> Gate {
        if self.can_reach(step) {
            self.gate(step)
        } else {
            Gate::Closed(EARLIER_STEPS_INCOMPLETE)
        }
    }
}
