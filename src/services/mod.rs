//! Services layer: the LLM boundary
//!
//! Project classification and task proposal are LLM judgments. The core
//! pipeline consumes them through the [`ProjectClassifier`] and
//! [`TaskProposer`] traits so every deterministic component can be tested
//! with fakes and zero network dependency.

pub mod llm;

pub use llm::{LlmConfig, LlmService};

use crate::error::Result;
use crate::types::TaskAssessment;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Input to a classification call
#[derive(Debug, Clone, Default)]
pub struct ClassifyRequest {
    /// Objectives inferred for the current observation, newline-joined
    pub recent_objectives: String,

    /// Recent behavioral propositions from the external context engine
    pub recent_propositions: String,

    /// Upcoming calendar events, one per line
    pub calendar_events: String,

    /// The last few project predictions, oldest first (continuity hint)
    pub recent_predictions: Vec<String>,

    /// The user's configured project names
    pub known_projects: Vec<String>,
}

/// Input to a proposal call
#[derive(Debug, Clone, Default)]
pub struct ProposeRequest {
    /// Short profile of the user
    pub user_profile: String,

    /// Project being proposed for
    pub project_name: String,

    /// Rendered scratchpad text for the project
    pub project_scratchpad: String,

    /// The user's own project description, if any
    pub project_description: Option<String>,

    /// What the user wants background agents to focus on, if stated
    pub user_agent_goals: Option<String>,
}

/// Everything one proposal run produces
#[derive(Debug, Clone, Default)]
pub struct ProposalBundle {
    /// Induced future goals
    pub future_goals: Vec<String>,

    /// Milestones per goal
    pub goal_to_milestones: BTreeMap<String, Vec<String>>,

    /// Proposed background-agent task descriptions
    pub agent_tasks: Vec<String>,

    /// One scored assessment per proposed task
    pub task_assessments: Vec<TaskAssessment>,
}

/// Classifies the user's current activity into one of their projects
///
/// Implementations must return one of the configured project names or the
/// fallback sentinel; the pipeline relies on that closed set.
#[async_trait]
pub trait ProjectClassifier: Send + Sync {
    /// Classify one observation into a project name
    async fn classify(&self, request: &ClassifyRequest) -> Result<String>;
}

/// Proposes and scores candidate background-agent tasks for a project
#[async_trait]
pub trait TaskProposer: Send + Sync {
    /// Run the goal → milestone → task → assessment pipeline
    async fn propose(&self, request: &ProposeRequest) -> Result<ProposalBundle>;
}
