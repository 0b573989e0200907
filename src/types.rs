//! Core data types for the Understudy pipeline
//!
//! This module defines the records exchanged between the activity pipeline,
//! the managers, and the LLM service boundary: context events coming in,
//! task assessments coming back from the scorer, and the structured report
//! every manager run produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel project used when the classifier cannot place the activity
/// in any configured project.
pub const FALLBACK_PROJECT: &str = "Misc";

/// One observation of the user's context at a point in time
///
/// Produced by an observation source (screen watcher, calendar poll, or the
/// CSV replay driver) and consumed by [`crate::state::StateManager`]. The
/// textual fields are already summarized; no raw captures travel through
/// the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEvent {
    /// When the observation was taken
    pub timestamp: DateTime<Utc>,

    /// Free-text summary of what the user is doing right now
    pub context_update: String,

    /// Recent behavioral propositions from the external context engine
    #[serde(default)]
    pub recent_propositions: String,

    /// Upcoming calendar events, one per line
    #[serde(default)]
    pub calendar_events: String,

    /// Objective strings inferred for this observation (may be empty)
    #[serde(default)]
    pub objectives: Vec<String>,

    /// Path to a saved screenshot, if the observation source captured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,
}

/// Outcome of running one context event through the state manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEvent {
    /// Project the event was classified into
    pub project: String,

    /// Objectives recorded alongside the classification
    pub objectives: Vec<String>,
}

/// Per-run caller context handed to managers
///
/// Everything here is optional; managers substitute empty strings where the
/// caller has nothing configured.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Short profile of the user (what kind of help they like)
    pub user_profile: String,

    /// The user's own description of the project, if they wrote one
    pub project_description: Option<String>,

    /// What the user wants background agents to focus on
    pub user_agent_goals: Option<String>,
}

/// An LLM-produced evaluation of one candidate background-agent task
///
/// All four scores are independent integers in `[0, 10]`. Assessments are
/// immutable once produced; the selection algorithm annotates copies rather
/// than mutating them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssessment {
    /// The task being scored, copied verbatim from the proposal
    pub task_description: String,

    /// The scorer's free-text justification for the four scores
    pub reasoning: String,

    /// How much the task advances the project's high-level goals
    pub value_score: u8,

    /// How low-risk the task is to run autonomously (10 = safest)
    pub safety_score: u8,

    /// How likely the agent can actually complete it with available context
    pub feasibility_score: u8,

    /// How well the task matches the user's stated agent preferences
    pub user_preference_alignment_score: u8,
}

/// A task assessment that survived selection, annotated with its
/// computed composite score and score ratio for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The underlying assessment
    #[serde(flatten)]
    pub assessment: TaskAssessment,

    /// Weighted composite score (value, feasibility, alignment)
    pub true_score: f64,

    /// `true_score / max_score`, in `[0, 1]`
    pub score_ratio: f64,
}

/// Notification emitted toward the user by the UI manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification kind, e.g. `project_return`
    #[serde(rename = "type")]
    pub kind: NotificationKind,

    /// Human-readable message
    pub message: String,
}

/// Notification kinds the UI manager can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The user returned to a project with reviewable pending items
    ProjectReturn,
}

/// Structured result of a manager run for one project
///
/// Both manager variants return this shape. The task-producing manager
/// fills the proposal/assessment fields; the UI manager at most sets
/// `notification`. A disabled project yields the empty report from
/// [`ProjectRunReport::empty`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRunReport {
    /// Project this run was for
    pub project: String,

    /// Induced future goals for the project
    pub future_goals: Vec<String>,

    /// Milestones proposed per goal
    pub goal_to_milestones: BTreeMap<String, Vec<String>>,

    /// Proposed background-agent task descriptions
    pub agent_tasks: Vec<String>,

    /// All scored assessments, unfiltered
    pub task_assessments: Vec<TaskAssessment>,

    /// Post-selection candidates, ranked
    pub candidates: Vec<ScoredCandidate>,

    /// Notification emitted by the UI manager, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl ProjectRunReport {
    /// An empty-but-well-formed report for `project`
    ///
    /// Used for the disabled-project and empty-scratchpad short circuits,
    /// which are expected states rather than errors.
    pub fn empty(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            future_goals: Vec::new(),
            goal_to_milestones: BTreeMap::new(),
            agent_tasks: Vec::new(),
            task_assessments: Vec::new(),
            candidates: Vec::new(),
            notification: None,
        }
    }
}
