//! Per-project scratchpad persistence
//!
//! The scratchpad is the durable knowledge base behind each project: one
//! row per line, grouped into canonical sections, addressed by display
//! index within a section. Managers consume it through the
//! [`ScratchpadStore`] trait so tests can substitute an in-memory fake.

pub mod store;

pub use store::{ScratchpadEntry, SqliteScratchpad};

use crate::error::Result;

/// Canonical scratchpad sections
///
/// Free-form (often LLM-generated) section labels are normalized onto
/// these; anything unrecognized lands in `Notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    OngoingObjectives,
    CompletedObjectives,
    Suggestions,
    Notes,
    ProjectResources,
    NextSteps,
    /// Artifacts background agents produced for the user to review
    PendingReview,
}

impl Section {
    /// All sections in render order
    pub const ALL: [Section; 7] = [
        Section::OngoingObjectives,
        Section::CompletedObjectives,
        Section::Suggestions,
        Section::Notes,
        Section::ProjectResources,
        Section::NextSteps,
        Section::PendingReview,
    ];

    /// Stable name used in the database and in rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::OngoingObjectives => "Ongoing Objectives",
            Section::CompletedObjectives => "Completed Objectives",
            Section::Suggestions => "Suggestions",
            Section::Notes => "Notes",
            Section::ProjectResources => "Project Resources",
            Section::NextSteps => "Next Steps",
            Section::PendingReview => "Agent Completed Tasks (Pending Review)",
        }
    }

    /// Normalize a free-form label onto a canonical section
    pub fn normalize(raw: &str) -> Section {
        let exact = Section::ALL.iter().find(|s| s.as_str() == raw);
        if let Some(section) = exact {
            return *section;
        }

        let low = raw.to_lowercase();
        if ["file", "repo", "folder", "collaborator", "resource"]
            .iter()
            .any(|key| low.contains(key))
        {
            return Section::ProjectResources;
        }
        if low.contains("next step") || low.contains("todo") {
            return Section::NextSteps;
        }
        Section::Notes
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read surface managers need from the scratchpad layer
///
/// Synchronous by design: the store is local SQLite, and the managers call
/// it from within their own async context without contention.
pub trait ScratchpadStore: Send + Sync {
    /// Whether background agents are administratively enabled for `project`
    ///
    /// Unknown projects default to enabled.
    fn is_project_enabled(&self, project: &str) -> Result<bool>;

    /// The user's own description of the project, if configured
    fn project_description(&self, project: &str) -> Result<Option<String>>;

    /// Render the project's scratchpad as LLM-readable text
    ///
    /// Empty string when the project has no entries at all.
    fn render(&self, project: &str) -> Result<String>;

    /// Whether any agent-completed artifacts are awaiting the user's review
    fn has_pending_reviewable_items(&self, project: &str) -> Result<bool>;
}
