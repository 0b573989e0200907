//! Ring buffer of recent project classifications
//!
//! Stores the last `max_len` (default 20) classification outcomes, oldest
//! first. Append-only at the tail; eviction only from the head. The buffer
//! is owned by the state manager and read by observers; it is not shared
//! across threads, so there is no locking here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One classification outcome at a point in time
///
/// Immutable once appended. Timestamps are expected to be non-decreasing
/// across appends (the caller feeds events in chronological order); this is
/// not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReading {
    /// When the classification was made
    pub timestamp: DateTime<Utc>,

    /// The classified project (or the fallback sentinel)
    pub project: String,

    /// Objectives inferred at that moment (may be empty)
    pub objectives: Vec<String>,
}

/// Ring-buffer history of recent project predictions
///
/// - [`ProjectHistory::append`] to add a new reading
/// - [`ProjectHistory::recent`] to get the latest K, oldest first
/// - [`ProjectHistory::last_project`] for the most recent project
#[derive(Debug, Clone)]
pub struct ProjectHistory {
    max_len: usize,
    items: VecDeque<ProjectReading>,
}

impl ProjectHistory {
    /// History retaining at most `max_len` readings
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            items: VecDeque::with_capacity(max_len),
        }
    }

    /// Record a new reading at the tail, evicting from the head if over
    /// capacity. Always succeeds.
    pub fn append(
        &mut self,
        timestamp: DateTime<Utc>,
        project: impl Into<String>,
        objectives: Vec<String>,
    ) {
        self.items.push_back(ProjectReading {
            timestamp,
            project: project.into(),
            objectives,
        });
        while self.items.len() > self.max_len {
            self.items.pop_front();
        }
    }

    /// Up to `n` most recent readings, oldest first
    pub fn recent(&self, n: usize) -> Vec<ProjectReading> {
        let start = self.items.len().saturating_sub(n);
        self.items.iter().skip(start).cloned().collect()
    }

    /// Project of the most recent reading, if any
    pub fn last_project(&self) -> Option<&str> {
        self.items.back().map(|r| r.project.as_str())
    }

    /// Number of retained readings
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ProjectHistory {
    /// Default capacity of 20 readings
    fn default() -> Self {
        Self::new(20)
    }
}
