//! Session records, the execution draft and its gates

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::timer::ElapsedTracker;
use crate::flow::{FlowStep, Gate, StepGate};

/// Steps of the session-execution flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStep {
    Details,
    PreSession,
    DuringSession,
    PostSession,
    Summary,
}

impl FlowStep for SessionStep {
    const FLOW: &'static str = "session";
    const ORDER: &'static [Self] = &[
        SessionStep::Details,
        SessionStep::PreSession,
        SessionStep::DuringSession,
        SessionStep::PostSession,
        SessionStep::Summary,
    ];

    fn name(self) -> &'static str {
        match self {
            SessionStep::Details => "details",
            SessionStep::PreSession => "pre-session",
            SessionStep::DuringSession => "during-session",
            SessionStep::PostSession => "post-session",
            SessionStep::Summary => "summary",
        }
    }
}

impl SessionStep {
    pub fn title(&self) -> &'static str {
        match self {
            SessionStep::Details => "Session Details",
            SessionStep::PreSession => "Pre-Session Setup",
            SessionStep::DuringSession => "Session in Progress",
            SessionStep::PostSession => "Session Complete",
            SessionStep::Summary => "Session Summary",
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    #[default]
    Upcoming,
    StartingSoon,
    Completed,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "Upcoming",
            SessionStatus::StartingSoon => "Starting Soon",
            SessionStatus::Completed => "Completed",
        }
    }
}

/// One entry of a session plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    /// Planned minutes
    pub duration: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Exercise {
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration,
            completed: false,
        }
    }
}

/// A scheduled session as the host knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub client: String,
    pub service: String,
    /// Display time, e.g. "2:00 PM"
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub price: u32,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session_plan: Vec<Exercise>,
}

/// A labelled checkbox (preparation checklist, follow-up actions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: false,
        }
    }
}

/// Items that must be ticked before a session can start
pub fn default_checklist() -> Vec<String> {
    [
        "Equipment prepared",
        "Space set up",
        "Client contacted",
        "Session plan reviewed",
        "Music/playlist ready",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// Follow-up actions offered after a session
pub fn default_follow_ups() -> Vec<String> {
    [
        "Send workout summary",
        "Schedule next session",
        "Update client progress",
        "Send nutrition tips",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMetric {
    Energy,
    Form,
    Engagement,
}

impl PerformanceMetric {
    pub fn all() -> &'static [PerformanceMetric] {
        &[
            PerformanceMetric::Energy,
            PerformanceMetric::Form,
            PerformanceMetric::Engagement,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceMetric::Energy => "Energy",
            PerformanceMetric::Form => "Form",
            PerformanceMetric::Engagement => "Engagement",
        }
    }
}

/// In-session client ratings on a 1-10 scale. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRatings {
    pub energy: u8,
    pub form: u8,
    pub engagement: u8,
}

impl PerformanceRatings {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn get(&self, metric: PerformanceMetric) -> u8 {
        match metric {
            PerformanceMetric::Energy => self.energy,
            PerformanceMetric::Form => self.form,
            PerformanceMetric::Engagement => self.engagement,
        }
    }

    pub(crate) fn set(&mut self, metric: PerformanceMetric, value: u8) {
        match metric {
            PerformanceMetric::Energy => self.energy = value,
            PerformanceMetric::Form => self.form = value,
            PerformanceMetric::Engagement => self.engagement = value,
        }
    }
}

impl Default for PerformanceRatings {
    fn default() -> Self {
        Self {
            energy: 5,
            form: 5,
            engagement: 5,
        }
    }
}

/// Client feedback captured after the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// 1-5 stars, unset until the client rates
    pub rating: Option<u8>,
    pub comments: String,
}

impl Feedback {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;
}

/// Aggregated numbers shown on the summary step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    pub completed_exercises: usize,
    pub total_exercises: usize,
    /// `completed / total`, 0 for an empty plan
    pub completion_rate: f64,
    pub elapsed_secs: u64,
}

/// Working state of one session execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDraft {
    /// The seeded record; its plan is edited in place
    pub session: SessionRecord,
    pub checklist: Vec<ChecklistItem>,
    /// Last-minute notes from pre-session
    pub prep_notes: String,
    pub timer: ElapsedTracker,
    /// Pointer into the plan; only ever moves forward
    pub current_exercise: usize,
    pub performance: PerformanceRatings,
    /// Notes taken while the session runs
    pub live_notes: String,
    pub notes: String,
    pub feedback: Feedback,
    pub next_session_plan: String,
    pub follow_ups: Vec<ChecklistItem>,
}

impl SessionDraft {
    pub fn new(session: SessionRecord, checklist: &[String], follow_ups: &[String]) -> Self {
        Self {
            session,
            checklist: checklist.iter().map(ChecklistItem::new).collect(),
            prep_notes: String::new(),
            timer: ElapsedTracker::new(),
            current_exercise: 0,
            performance: PerformanceRatings::default(),
            live_notes: String::new(),
            notes: String::new(),
            feedback: Feedback::default(),
            next_session_plan: String::new(),
            follow_ups: follow_ups.iter().map(ChecklistItem::new).collect(),
        }
    }

    pub fn plan(&self) -> &[Exercise] {
        &self.session.session_plan
    }

    pub fn checklist_complete(&self) -> bool {
        self.checklist.iter().all(|item| item.checked)
    }

    pub fn completed_exercises(&self) -> usize {
        self.plan().iter().filter(|ex| ex.completed).count()
    }

    pub fn total_exercises(&self) -> usize {
        self.plan().len()
    }

    pub fn completion_rate(&self) -> f64 {
        match self.total_exercises() {
            0 => 0.0,
            total => self.completed_exercises() as f64 / total as f64,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            completed_exercises: self.completed_exercises(),
            total_exercises: self.total_exercises(),
            completion_rate: self.completion_rate(),
            elapsed_secs: self.timer.elapsed_secs(),
        }
    }
}

impl StepGate<SessionStep> for SessionDraft {
    fn gate(&self, step: SessionStep) -> Gate {
        match step {
            SessionStep::PreSession if !self.checklist_complete() => {
                Gate::Closed("Complete all checklist items to start the session")
            }
            SessionStep::DuringSession if self.completed_exercises() == 0 => {
                Gate::Closed("Complete at least one exercise to end the session")
            }
            SessionStep::Details
            | SessionStep::PreSession
            | SessionStep::DuringSession
            | SessionStep::PostSession => Gate::Open,
            SessionStep::Summary => Gate::Terminal,
        }
    }
}
