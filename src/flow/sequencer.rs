//! Step ordering and navigation

use std::fmt;

use tracing::debug;

use super::gate::{Gate, EARLIER_STEPS_INCOMPLETE};
use crate::error::{FlowError, Result};

/// A closed, ordered set of steps for one flow.
///
/// `ORDER` is the source of truth for step ordering; every navigation helper
/// derives from it.
pub trait FlowStep: Copy + Eq + fmt::Debug + 'static {
    /// Flow name used in logs
    const FLOW: &'static str;
    /// Steps in their fixed order
    const ORDER: &'static [Self];

    /// Kebab-case step name, as used by hosts for `go_to`
    fn name(self) -> &'static str;

    /// 0-based position in `ORDER`
    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|&s| s == self)
            .unwrap_or(usize::MAX)
    }

    fn first() -> Self {
        Self::ORDER[0]
    }

    fn is_first(self) -> bool {
        self.index() == 0
    }

    fn is_last(self) -> bool {
        self.index() == Self::ORDER.len() - 1
    }

    /// Next step, or None at the last step
    fn successor(self) -> Option<Self> {
        Self::ORDER.get(self.index().checked_add(1)?).copied()
    }

    /// Previous step, or None at the first step
    fn predecessor(self) -> Option<Self> {
        Self::ORDER.get(self.index().checked_sub(1)?).copied()
    }

    /// Look a step up by name
    fn from_name(name: &str) -> Result<Self> {
        Self::ORDER
            .iter()
            .copied()
            .find(|s| s.name() == name)
            .ok_or_else(|| FlowError::UnknownStep(name.to_string()))
    }
}

/// Outcome of a forward request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance<S> {
    /// Moved to a new step
    Moved { from: S, to: S },
    /// Gate closed; nothing changed
    Blocked { step: S, reason: &'static str },
    /// Already at the last step; the host should run the terminal action
    Complete,
}

impl<S> Advance<S> {
    pub fn is_moved(&self) -> bool {
        matches!(self, Advance::Moved { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Advance::Blocked { .. })
    }
}

/// Outcome of a backward request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat<S> {
    Moved { from: S, to: S },
    /// Backed out of the first step; the flow should be cancelled
    Exit,
}

/// Tracks the current step of a flow. Progress is always derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer<S: FlowStep> {
    current: S,
}

impl<S: FlowStep> Sequencer<S> {
    pub fn new(initial: S) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn total(&self) -> usize {
        S::ORDER.len()
    }

    /// 1-based position for "Step n of m" labels
    pub fn position(&self) -> usize {
        self.current.index() + 1
    }

    /// `(index + 1) / total`, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        self.position() as f64 / self.total() as f64
    }

    /// Move forward if `gate` allows it
    pub fn advance(&mut self, gate: Gate) -> Advance<S> {
        let from = self.current;
        let Some(to) = from.successor() else {
            return Advance::Complete;
        };

        match gate {
            Gate::Open => {
                self.current = to;
                debug!(flow = S::FLOW, from = from.name(), to = to.name(), "step advanced");
                Advance::Moved { from, to }
            }
            Gate::Closed(reason) => {
                debug!(flow = S::FLOW, step = from.name(), reason, "advance blocked");
                Advance::Blocked { step: from, reason }
            }
            // Terminal gates only belong to the last step, which returned above
            Gate::Terminal => Advance::Complete,
        }
    }

    /// Move back one step. Never gated.
    pub fn retreat(&mut self) -> Retreat<S> {
        let from = self.current;
        match from.predecessor() {
            Some(to) => {
                self.current = to;
                debug!(flow = S::FLOW, from = from.name(), to = to.name(), "step retreated");
                Retreat::Moved { from, to }
            }
            None => Retreat::Exit,
        }
    }

    /// Jump to any step. Forward jumps require `reachable`; backward jumps always succeed.
    pub fn jump(&mut self, target: S, reachable: bool) -> Advance<S> {
        let from = self.current;
        if target.index() > from.index() && !reachable {
            debug!(flow = S::FLOW, from = from.name(), to = target.name(), "jump blocked");
            return Advance::Blocked {
                step: from,
                reason: EARLIER_STEPS_INCOMPLETE,
            };
        }
        self.current = target;
        debug!(flow = S::FLOW, from = from.name(), to = target.name(), "step jumped");
        Advance::Moved { from, to: target }
    }
}
