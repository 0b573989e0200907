//! Project activity transition detection
//!
//! One observer, two modes:
//!
//! - `Departure`: the user was on PROJECT_A for a good stretch, then
//!   switched to PROJECT_B → trigger background work for PROJECT_A.
//! - `Arrival`: the user returned to a project after a meaningful absence
//!   → trigger the downstream manager for that project (typically a
//!   notification about reviewable artifacts).
//!
//! Both modes reduce to "segment boundary + minimum evidence + minimum
//! elapsed time + dedup", which is why they share one implementation
//! rather than two types. Every guard failure is a silent early return:
//! "not enough evidence yet" is the expected steady state, not an error.

use crate::context::{last_seen_before, last_two_segments, ProjectHistory};
use crate::error::Result;
use crate::managers::ProjectManager;
use crate::types::{ProjectRunReport, RunContext};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Which transition the observer watches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverMode {
    /// Fire for the project the user just left
    Departure,
    /// Fire for the project the user just returned to
    Arrival,
}

/// Observer tuning knobs
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Transition to watch for
    pub mode: ObserverMode,

    /// How many recent readings to consider
    pub window_size: usize,

    /// Departure: minimum readings in the segment being left
    pub min_entries_previous_segment: usize,

    /// Arrival: minimum readings in the current segment
    pub min_entries_current_segment: usize,

    /// Minimum elapsed time for the transition to count
    pub time_threshold: Duration,
}

impl ObserverConfig {
    /// Defaults for a departure observer, matching the settings-file
    /// defaults in [`crate::config::Settings`]
    pub fn departure() -> Self {
        Self {
            mode: ObserverMode::Departure,
            window_size: 20,
            min_entries_previous_segment: 3,
            min_entries_current_segment: 1,
            time_threshold: Duration::minutes(3),
        }
    }

    /// Defaults for an arrival observer, matching the settings-file
    /// defaults in [`crate::config::Settings`]
    pub fn arrival() -> Self {
        Self {
            mode: ObserverMode::Arrival,
            window_size: 20,
            min_entries_previous_segment: 3,
            min_entries_current_segment: 1,
            time_threshold: Duration::minutes(15),
        }
    }
}

/// Side-effect hook invoked after each successful trigger (CSV logging etc.)
pub type TriggerHook = Box<dyn Fn(&str, &ProjectRunReport) + Send + Sync>;

/// Stateful transition detector over the shared classification history
///
/// The observer reads history but never mutates it; the driver owns the
/// buffer and passes it in on every invocation. The dedup key guarantees a
/// given segment boundary triggers the manager at most once, so calling
/// [`ProjectActivityObserver::handle_processed`] repeatedly with no new
/// readings is an idempotent no-op.
pub struct ProjectActivityObserver {
    config: ObserverConfig,
    manager: Arc<dyn ProjectManager>,
    run_context: RunContext,
    on_trigger: Option<TriggerHook>,
    last_triggered_key: Option<String>,
}

impl ProjectActivityObserver {
    /// New observer dispatching to `manager`
    pub fn new(config: ObserverConfig, manager: Arc<dyn ProjectManager>) -> Self {
        Self {
            config,
            manager,
            run_context: RunContext::default(),
            on_trigger: None,
            last_triggered_key: None,
        }
    }

    /// Attach the per-run caller context passed to the manager
    pub fn with_run_context(mut self, ctx: RunContext) -> Self {
        self.run_context = ctx;
        self
    }

    /// Attach a side-effect hook invoked on every trigger
    pub fn with_trigger_hook(mut self, hook: TriggerHook) -> Self {
        self.on_trigger = Some(hook);
        self
    }

    /// Check for a qualifying transition; invoked after every new reading
    ///
    /// Returns the manager's report when the observer fired, `None` when
    /// any guard condition held. Manager errors propagate.
    pub async fn handle_processed(
        &mut self,
        history: &ProjectHistory,
    ) -> Result<Option<ProjectRunReport>> {
        let readings = history.recent(self.config.window_size);

        let Some(trigger) = self.detect(&readings) else {
            return Ok(None);
        };

        if self.last_triggered_key.as_deref() == Some(trigger.key.as_str()) {
            return Ok(None);
        }

        info!(
            "{:?} transition detected for {} → running manager",
            self.config.mode, trigger.project
        );
        let report = self
            .manager
            .run_for_project(&trigger.project, &self.run_context)
            .await?;
        if let Some(hook) = &self.on_trigger {
            hook(&trigger.project, &report);
        }
        self.last_triggered_key = Some(trigger.key);
        Ok(Some(report))
    }

    fn detect(&self, readings: &[crate::context::ProjectReading]) -> Option<Trigger> {
        match self.config.mode {
            ObserverMode::Departure => self.detect_departure(readings),
            ObserverMode::Arrival => self.detect_arrival(readings),
        }
    }

    fn detect_departure(&self, readings: &[crate::context::ProjectReading]) -> Option<Trigger> {
        let (current, previous) = last_two_segments(readings)?;
        let previous = previous?;

        // enough samples in the segment we just left?
        if previous.count < self.config.min_entries_previous_segment {
            return None;
        }

        // elapsed time is measured start-to-start: "we were on the previous
        // project from when we first saw it until we started the current
        // one". A long previous engagement therefore counts in full.
        let gap = current.start - previous.start;
        if gap < self.config.time_threshold {
            debug!(
                "departure from {} below time threshold ({} < {})",
                previous.project, gap, self.config.time_threshold
            );
            return None;
        }

        Some(Trigger {
            key: format!(
                "{}:{}:{}",
                previous.project,
                previous.start.to_rfc3339(),
                current.start.to_rfc3339()
            ),
            project: previous.project,
        })
    }

    fn detect_arrival(&self, readings: &[crate::context::ProjectReading]) -> Option<Trigger> {
        let (current, _) = last_two_segments(readings)?;

        if current.count < self.config.min_entries_current_segment {
            return None;
        }

        // most recent sighting of this project before the current segment;
        // none means a first visit within the window, nothing to return to
        let last_seen_end = last_seen_before(readings, current.count, &current.project)?;

        let absence = current.start - last_seen_end;
        if absence < self.config.time_threshold {
            return None;
        }

        Some(Trigger {
            key: format!(
                "{}:{}:{}",
                current.project,
                current.start.to_rfc3339(),
                last_seen_end.to_rfc3339()
            ),
            project: current.project,
        })
    }
}

struct Trigger {
    project: String,
    key: String,
}
