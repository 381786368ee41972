//! Session-execution flow: details → pre-session → during-session → post-session → summary

mod draft;
pub mod timer;

pub use draft::{
    default_checklist, default_follow_ups, ChecklistItem, Exercise, Feedback, PerformanceMetric,
    PerformanceRatings, SessionDraft, SessionRecord, SessionStatus, SessionStep, SessionSummary,
};
pub use timer::{format_elapsed, ElapsedTracker, TimerState, Ticker};

use tracing::{debug, info, warn};

use crate::error::{FlowError, Result};
use crate::flow::{Advance, FlowCallbacks, FlowStep, Gate, Retreat, Sequencer, StepGate};

/// Drives a [`SessionDraft`] from review to summary.
///
/// The elapsed tracker only runs inside `during-session`; any navigation out
/// of that step stops it and keeps the value it reached.
#[derive(Debug)]
pub struct SessionFlow {
    seq: Sequencer<SessionStep>,
    draft: SessionDraft,
    callbacks: FlowCallbacks<SessionDraft>,
}

impl SessionFlow {
    /// Start executing `record` with fresh checklist and follow-up lists
    pub fn new(
        record: SessionRecord,
        checklist: &[String],
        follow_ups: &[String],
        initial: SessionStep,
        callbacks: FlowCallbacks<SessionDraft>,
    ) -> Self {
        Self::resume(SessionDraft::new(record, checklist, follow_ups), initial, callbacks)
    }

    /// Continue an existing draft at `initial`
    pub fn resume(
        mut draft: SessionDraft,
        initial: SessionStep,
        callbacks: FlowCallbacks<SessionDraft>,
    ) -> Self {
        if initial != SessionStep::DuringSession {
            draft.timer.stop();
        }
        debug!(
            step = initial.name(),
            client = %draft.session.client,
            "session flow opened"
        );
        Self {
            seq: Sequencer::new(initial),
            draft,
            callbacks,
        }
    }

    pub fn step(&self) -> SessionStep {
        self.seq.current()
    }

    pub fn draft(&self) -> &SessionDraft {
        &self.draft
    }

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

    pub fn can_continue(&self) -> bool {
        self.gate().is_open()
    }

    pub fn summary(&self) -> SessionSummary {
        self.draft.summary()
    }

    fn require(&self, expected: SessionStep) -> Result<()> {
        let actual = self.step();
        if actual == expected {
            Ok(())
        } else {
            warn!(expected = expected.name(), actual = actual.name(), "session edit from wrong step");
            Err(FlowError::StepMismatch {
                expected: expected.name(),
                actual: actual.name(),
            })
        }
    }

    /// Freeze the tracker when navigation leaves during-session
    fn left_step(&mut self, from: SessionStep) {
        if from == SessionStep::DuringSession && self.draft.timer.is_running() {
            self.draft.timer.stop();
            debug!(elapsed = self.draft.timer.elapsed_secs(), "timer frozen");
        }
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    pub fn next(&mut self) -> Advance<SessionStep> {
        let gate = self.gate();
        let result = self.seq.advance(gate);
        if let Advance::Moved { from, .. } = result {
            self.left_step(from);
        }
        result
    }

    /// Go back one step. Backing out of `details` cancels the flow.
    pub fn back(&mut self) -> Retreat<SessionStep> {
        let result = self.seq.retreat();
        match result {
            Retreat::Moved { from, .. } => self.left_step(from),
            Retreat::Exit => {
                info!(client = %self.draft.session.client, "session flow cancelled");
                self.callbacks.cancel();
            }
        }
        result
    }

    /// Jump to a named step. Forward jumps need every earlier gate open.
    pub fn go_to(&mut self, name: &str) -> Result<Advance<SessionStep>> {
        let target = SessionStep::from_name(name)?;
        let reachable = self.draft.can_reach(target);
        let result = self.seq.jump(target, reachable);
        if let Advance::Moved { from, to } = result {
            if from != to {
                self.left_step(from);
            }
        }
        Ok(result)
    }

    /// Mark the session completed and emit the draft to the host.
    ///
    /// Only valid on the summary step with every earlier gate open (checklist
    /// done, at least one exercise completed); otherwise the flow is handed back.
    #[allow(clippy::result_large_err)]
    pub fn complete(self) -> std::result::Result<(), Self> {
        if self.step() != SessionStep::Summary || !self.draft.can_reach(SessionStep::Summary) {
            debug!(step = self.step().name(), "complete ignored");
            return Err(self);
        }

        let Self {
            mut draft,
            callbacks,
            ..
        } = self;
        draft.timer.stop();
        draft.session.status = SessionStatus::Completed;
        let summary = draft.summary();
        info!(
            client = %draft.session.client,
            completed = summary.completed_exercises,
            total = summary.total_exercises,
            elapsed = %format_elapsed(summary.elapsed_secs),
            "session completed"
        );
        callbacks.complete(draft);
        Ok(())
    }

    // ─── Pre-session ────────────────────────────────────────────────────────

    pub fn toggle_checklist(&mut self, index: usize) -> Result<bool> {
        self.require(SessionStep::PreSession)?;
        let len = self.draft.checklist.len();
        let item = self
            .draft
            .checklist
            .get_mut(index)
            .ok_or(FlowError::IndexOutOfRange {
                list: "checklist",
                index,
                len,
            })?;
        item.checked = !item.checked;
        Ok(item.checked)
    }

    pub fn set_prep_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        self.require(SessionStep::PreSession)?;
        self.draft.prep_notes = notes.into();
        Ok(())
    }

    /// Append an exercise to the plan
    pub fn add_exercise(&mut self, name: impl Into<String>, duration: u32) -> Result<()> {
        self.require(SessionStep::PreSession)?;
        self.draft
            .session
            .session_plan
            .push(Exercise::new(name, duration));
        Ok(())
    }

    /// Remove an exercise from the plan, keeping the pointer on the same entry
    pub fn remove_exercise(&mut self, index: usize) -> Result<Exercise> {
        self.require(SessionStep::PreSession)?;
        let len = self.draft.total_exercises();
        if index >= len {
            return Err(FlowError::ExerciseOutOfRange { index, len });
        }
        let removed = self.draft.session.session_plan.remove(index);
        let current = &mut self.draft.current_exercise;
        if *current > index {
            *current -= 1;
        }
        *current = (*current).min(len.saturating_sub(2));
        Ok(removed)
    }

    // ─── During session ─────────────────────────────────────────────────────

    /// Start or pause the elapsed tracker
    pub fn toggle_timer(&mut self) -> Result<TimerState> {
        self.require(SessionStep::DuringSession)?;
        let state = self.draft.timer.toggle();
        debug!(?state, elapsed = self.draft.timer.elapsed_secs(), "timer toggled");
        Ok(state)
    }

    /// Feed one interval to the tracker. Ignored outside during-session.
    pub fn tick(&mut self) -> bool {
        self.step() == SessionStep::DuringSession && self.draft.timer.tick()
    }

    /// Mark exercise `index` done and move the pointer past it
    pub fn complete_exercise(&mut self, index: usize) -> Result<()> {
        self.require(SessionStep::DuringSession)?;
        let len = self.draft.total_exercises();
        let exercise = self
            .draft
            .session
            .session_plan
            .get_mut(index)
            .ok_or(FlowError::ExerciseOutOfRange { index, len })?;
        exercise.completed = true;
        debug!(exercise = %exercise.name, "exercise completed");

        if index + 1 < len {
            self.draft.current_exercise = self.draft.current_exercise.max(index + 1);
        }
        Ok(())
    }

    /// Move the pointer on without completing the current exercise.
    /// At the last exercise this changes nothing.
    pub fn skip_exercise(&mut self) -> Result<()> {
        self.require(SessionStep::DuringSession)?;
        let len = self.draft.total_exercises();
        let current = self.draft.current_exercise;
        if current >= len {
            return Err(FlowError::ExerciseOutOfRange {
                index: current,
                len,
            });
        }
        if current + 1 < len {
            self.draft.current_exercise = current + 1;
            debug!(skipped = current, "exercise skipped");
        }
        Ok(())
    }

    /// Flip an exercise's completed flag without moving the pointer
    pub fn toggle_exercise_completed(&mut self, index: usize) -> Result<bool> {
        self.require(SessionStep::DuringSession)?;
        let len = self.draft.total_exercises();
        let exercise = self
            .draft
            .session
            .session_plan
            .get_mut(index)
            .ok_or(FlowError::ExerciseOutOfRange { index, len })?;
        exercise.completed = !exercise.completed;
        Ok(exercise.completed)
    }

    pub fn set_performance(&mut self, metric: PerformanceMetric, value: u8) -> Result<()> {
        self.require(SessionStep::DuringSession)?;
        let value = FlowError::check_rating(
            metric.label(),
            value,
            PerformanceRatings::MIN,
            PerformanceRatings::MAX,
        )?;
        self.draft.performance.set(metric, value);
        Ok(())
    }

    pub fn set_live_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        self.require(SessionStep::DuringSession)?;
        self.draft.live_notes = notes.into();
        Ok(())
    }

    // ─── Post-session ───────────────────────────────────────────────────────

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<()> {
        self.require(SessionStep::PostSession)?;
        self.draft.notes = notes.into();
        Ok(())
    }

    /// Client star rating, 1-5
    pub fn set_feedback_rating(&mut self, rating: u8) -> Result<()> {
        self.require(SessionStep::PostSession)?;
        let rating = FlowError::check_rating(
            "feedback",
            rating,
            Feedback::MIN_RATING,
            Feedback::MAX_RATING,
        )?;
        self.draft.feedback.rating = Some(rating);
        Ok(())
    }

    pub fn set_feedback_comments(&mut self, comments: impl Into<String>) -> Result<()> {
        self.require(SessionStep::PostSession)?;
        self.draft.feedback.comments = comments.into();
        Ok(())
    }

    pub fn set_next_session_plan(&mut self, plan: impl Into<String>) -> Result<()> {
        self.require(SessionStep::PostSession)?;
        self.draft.next_session_plan = plan.into();
        Ok(())
    }

    pub fn toggle_follow_up(&mut self, index: usize) -> Result<bool> {
        self.require(SessionStep::PostSession)?;
        let len = self.draft.follow_ups.len();
        let item = self
            .draft
            .follow_ups
            .get_mut(index)
            .ok_or(FlowError::IndexOutOfRange {
                list: "follow-up",
                index,
                len,
            })?;
        item.checked = !item.checked;
        Ok(item.checked)
    }
}
