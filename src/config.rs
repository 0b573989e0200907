//! Settings for scoring, selection, and transition sensitivity
//!
//! Settings live in a user-editable YAML file and are re-read at the start
//! of every manager run, so edits take effect without a restart. A missing
//! or malformed file is never an error: the loader logs a warning and falls
//! back to the documented defaults.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn default_value_weight() -> f64 {
    2.0
}
fn default_feasibility_weight() -> f64 {
    1.5
}
fn default_alignment_weight() -> f64 {
    0.5
}
fn default_safety_threshold() -> u8 {
    7
}
fn default_deployment_threshold() -> f64 {
    0.9
}
fn default_max_deployed_tasks() -> i64 {
    3
}

/// Weights and thresholds for task scoring and selection
///
/// Consumed fresh on every `run_for_project` call; the selection algorithm
/// itself never caches these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSettings {
    /// Weight applied to `value_score`
    #[serde(default = "default_value_weight")]
    pub value_weight: f64,

    /// Weight applied to `feasibility_score`
    #[serde(default = "default_feasibility_weight")]
    pub feasibility_weight: f64,

    /// Weight applied to `user_preference_alignment_score`
    #[serde(default = "default_alignment_weight")]
    pub user_preference_alignment_weight: f64,

    /// Minimum `safety_score` for a task to be considered at all
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: u8,

    /// Minimum `score_ratio` (in `[0, 1]`) for deployment
    #[serde(default = "default_deployment_threshold")]
    pub deployment_threshold: f64,

    /// Cap on the final candidate list; zero or negative means no cap
    #[serde(default = "default_max_deployed_tasks")]
    pub max_deployed_tasks: i64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            value_weight: default_value_weight(),
            feasibility_weight: default_feasibility_weight(),
            user_preference_alignment_weight: default_alignment_weight(),
            safety_threshold: default_safety_threshold(),
            deployment_threshold: default_deployment_threshold(),
            max_deployed_tasks: default_max_deployed_tasks(),
        }
    }
}

fn default_departure_min_entries() -> usize {
    3
}
fn default_departure_minutes() -> f64 {
    3.0
}
fn default_arrival_min_entries() -> usize {
    1
}
fn default_arrival_minutes() -> f64 {
    15.0
}
fn default_cooldown_seconds() -> f64 {
    60.0
}

/// Full settings file contents
///
/// The file is flat YAML; selection keys sit next to the transition
/// sensitivity keys, matching how users edit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Scoring/selection knobs
    #[serde(flatten)]
    pub selection: SelectionSettings,

    /// Minimum readings in the segment being departed from
    #[serde(default = "default_departure_min_entries")]
    pub departure_min_entries_previous_segment: usize,

    /// Minimum elapsed minutes (previous-segment start to current-segment
    /// start) before a departure counts
    #[serde(default = "default_departure_minutes")]
    pub departure_time_threshold_minutes: f64,

    /// Minimum readings in the current segment before an arrival counts
    #[serde(default = "default_arrival_min_entries")]
    pub arrival_min_entries_current_segment: usize,

    /// Minimum minutes away from a project before a return counts
    #[serde(default = "default_arrival_minutes")]
    pub arrival_time_threshold_minutes: f64,

    /// Seconds between live observations
    #[serde(default = "default_cooldown_seconds")]
    pub observation_cooldown_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selection: SelectionSettings::default(),
            departure_min_entries_previous_segment: default_departure_min_entries(),
            departure_time_threshold_minutes: default_departure_minutes(),
            arrival_min_entries_current_segment: default_arrival_min_entries(),
            arrival_time_threshold_minutes: default_arrival_minutes(),
            observation_cooldown_seconds: default_cooldown_seconds(),
        }
    }
}

impl Settings {
    /// Departure time threshold as a [`chrono::Duration`]
    pub fn departure_time_threshold(&self) -> Duration {
        minutes_to_duration(self.departure_time_threshold_minutes)
    }

    /// Arrival time threshold as a [`chrono::Duration`]
    pub fn arrival_time_threshold(&self) -> Duration {
        minutes_to_duration(self.arrival_time_threshold_minutes)
    }
}

fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0) as i64)
}

/// Re-readable handle on the settings file
///
/// Managers keep one of these and call [`SettingsLoader::load`] at the top
/// of every run so that live edits to the YAML take effect on the very next
/// trigger.
#[derive(Debug, Clone, Default)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
}

impl SettingsLoader {
    /// Loader bound to a settings file
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Loader that always yields defaults (no file configured)
    pub fn defaults() -> Self {
        Self { path: None }
    }

    /// Read the settings file, falling back to defaults on any failure
    pub fn load(&self) -> Settings {
        let Some(path) = &self.path else {
            return Settings::default();
        };

        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_yaml::from_str::<Settings>(&raw) {
                Ok(settings) => {
                    debug!("loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!(
                        "settings file {} is malformed ({}); using defaults",
                        path.display(),
                        e
                    );
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(
                    "could not read settings file {} ({}); using defaults",
                    path.display(),
                    e
                );
                Settings::default()
            }
        }
    }
}
