//! UI-facing manager, triggered on arrival
//!
//! When the user returns to a project, check whether background agents
//! left anything for them to review; if so, notify. The actual delivery
//! mechanism (desktop toast, menu-bar badge) lives behind the
//! [`Notifier`] trait and is out of core scope.

use crate::error::Result;
use crate::managers::ProjectManager;
use crate::scratchpad::ScratchpadStore;
use crate::types::{Notification, NotificationKind, ProjectRunReport, RunContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Out-of-band notification delivery
pub trait Notifier: Send + Sync {
    /// Deliver one notification to the user
    fn notify(&self, project: &str, notification: &Notification) -> Result<()>;
}

/// Notifies the user about reviewable work when they return to a project
pub struct UiManager {
    scratchpad: Arc<dyn ScratchpadStore>,
    notifier: Option<Box<dyn Notifier>>,
}

impl UiManager {
    /// Manager that only reports (no delivery side effect)
    pub fn new(scratchpad: Arc<dyn ScratchpadStore>) -> Self {
        Self {
            scratchpad,
            notifier: None,
        }
    }

    /// Attach a delivery mechanism
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

#[async_trait]
impl ProjectManager for UiManager {
    async fn run_for_project(&self, project: &str, _ctx: &RunContext) -> Result<ProjectRunReport> {
        info!("ui manager: project return → {}", project);

        if !self.scratchpad.is_project_enabled(project)? {
            return Ok(ProjectRunReport::empty(project));
        }

        if !self.scratchpad.has_pending_reviewable_items(project)? {
            debug!("ui manager: nothing pending review for {}", project);
            return Ok(ProjectRunReport::empty(project));
        }

        let notification = Notification {
            kind: NotificationKind::ProjectReturn,
            message: format!(
                "Welcome back to {}. Agent-completed work is waiting for your review.",
                project
            ),
        };

        if let Some(notifier) = &self.notifier {
            notifier.notify(project, &notification)?;
        }

        let mut report = ProjectRunReport::empty(project);
        report.notification = Some(notification);
        Ok(report)
    }
}
