//! Managers triggered by activity transitions
//!
//! Both manager variants implement the single-method [`ProjectManager`]
//! dispatch contract so the transition observer can stay agnostic about
//! what happens downstream: the task manager proposes, scores, and selects
//! background-agent work; the UI manager at most notifies the user.

pub mod selection;
pub mod task_manager;
pub mod ui_manager;

pub use selection::select_candidates;
pub use task_manager::TaskAgentManager;
pub use ui_manager::{Notifier, UiManager};

use crate::error::Result;
use crate::types::{ProjectRunReport, RunContext};
use async_trait::async_trait;

/// Dispatch contract between observers and managers
///
/// Implementations must tolerate being called for a project whose
/// background-agent feature is disabled: that is a short circuit to an
/// empty [`ProjectRunReport`], never an error.
#[async_trait]
pub trait ProjectManager: Send + Sync {
    /// Run this manager for one project and return a structured report
    async fn run_for_project(&self, project: &str, ctx: &RunContext) -> Result<ProjectRunReport>;
}
