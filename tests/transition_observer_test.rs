//! Transition observer behavior over realistic activity traces

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use understudy::{
    error::Result, ObserverConfig, ObserverMode, ProjectActivityObserver, ProjectHistory,
    ProjectManager, ProjectRunReport, RunContext,
};

struct RecordingManager {
    calls: Mutex<Vec<String>>,
}

impl RecordingManager {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectManager for RecordingManager {
    async fn run_for_project(&self, project: &str, _ctx: &RunContext) -> Result<ProjectRunReport> {
        self.calls.lock().unwrap().push(project.to_string());
        Ok(ProjectRunReport::empty(project))
    }
}

fn history(entries: &[(i64, &str)]) -> ProjectHistory {
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let mut history = ProjectHistory::new(20);
    for (minute, project) in entries {
        history.append(base + Duration::minutes(*minute), *project, vec![]);
    }
    history
}

fn departure(min_entries: usize, threshold_minutes: i64) -> ObserverConfig {
    ObserverConfig {
        mode: ObserverMode::Departure,
        min_entries_previous_segment: min_entries,
        time_threshold: Duration::minutes(threshold_minutes),
        ..ObserverConfig::departure()
    }
}

fn arrival(threshold_minutes: i64) -> ObserverConfig {
    ObserverConfig {
        mode: ObserverMode::Arrival,
        min_entries_current_segment: 1,
        time_threshold: Duration::minutes(threshold_minutes),
        ..ObserverConfig::arrival()
    }
}

#[tokio::test]
async fn departure_fires_once_as_readings_accumulate() {
    // the user works on Alpha, then switches to Beta; the observer runs
    // after every new reading and must fire exactly once, at the reading
    // where both the evidence and the elapsed-time guard first pass
    let trace = [(0, "Alpha"), (5, "Alpha"), (10, "Alpha"), (20, "Beta")];
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(departure(3, 10), manager.clone());

    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    assert_eq!(manager.calls(), vec!["Alpha".to_string()]);
}

#[tokio::test]
async fn departure_stays_quiet_during_steady_work() {
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(departure(3, 10), manager.clone());

    let trace = [(0, "Alpha"), (5, "Alpha"), (10, "Alpha"), (15, "Alpha")];
    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn rapid_switching_never_meets_the_evidence_bar() {
    // one reading per project: no segment accumulates min_entries, so the
    // observer never considers any of the switches a real departure
    let trace = [(0, "Alpha"), (12, "Beta"), (24, "Gamma"), (36, "Alpha")];
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(departure(3, 10), manager.clone());

    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn consecutive_departures_each_fire() {
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(departure(2, 5), manager.clone());

    let trace = [
        (0, "Alpha"),
        (3, "Alpha"),
        (8, "Beta"),
        (11, "Beta"),
        (16, "Gamma"),
    ];
    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    assert_eq!(
        manager.calls(),
        vec!["Alpha".to_string(), "Beta".to_string()]
    );
}

#[tokio::test]
async fn arrival_fires_on_return_not_on_leave() {
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(arrival(15), manager.clone());

    let trace = [
        (0, "Alpha"),
        (4, "Alpha"),
        (8, "Beta"),
        (12, "Beta"),
        (30, "Alpha"),
        (34, "Alpha"),
    ];
    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    // fired once, at the reading where Alpha reappeared after >15 min away
    assert_eq!(manager.calls(), vec!["Alpha".to_string()]);
}

#[tokio::test]
async fn arrival_ignores_short_breaks() {
    let manager = RecordingManager::new();
    let mut obs = ProjectActivityObserver::new(arrival(15), manager.clone());

    let trace = [(0, "Alpha"), (4, "Beta"), (10, "Alpha")];
    for upto in 1..=trace.len() {
        obs.handle_processed(&history(&trace[..upto])).await.unwrap();
    }

    assert!(manager.calls().is_empty());
}

#[tokio::test]
async fn both_observers_can_watch_the_same_history() {
    let departures_seen = RecordingManager::new();
    let arrivals_seen = RecordingManager::new();
    let mut departures =
        ProjectActivityObserver::new(departure(2, 5), departures_seen.clone());
    let mut arrivals = ProjectActivityObserver::new(arrival(15), arrivals_seen.clone());

    let trace = [
        (0, "Alpha"),
        (4, "Alpha"),
        (10, "Beta"),
        (14, "Beta"),
        (30, "Alpha"),
    ];
    for upto in 1..=trace.len() {
        let h = history(&trace[..upto]);
        departures.handle_processed(&h).await.unwrap();
        arrivals.handle_processed(&h).await.unwrap();
    }

    // leaving Alpha then Beta triggers the departure manager; returning
    // to Alpha after 26 minutes triggers the arrival manager
    assert_eq!(
        departures_seen.calls(),
        vec!["Alpha".to_string(), "Beta".to_string()]
    );
    assert_eq!(arrivals_seen.calls(), vec!["Alpha".to_string()]);
}

#[tokio::test]
async fn manager_errors_propagate_to_the_caller() {
    struct FailingManager;

    #[async_trait]
    impl ProjectManager for FailingManager {
        async fn run_for_project(
            &self,
            _project: &str,
            _ctx: &RunContext,
        ) -> Result<ProjectRunReport> {
            Err(understudy::UnderstudyError::LlmApi("api down".to_string()))
        }
    }

    let mut obs =
        ProjectActivityObserver::new(departure(3, 10), Arc::new(FailingManager));
    let h = history(&[(0, "Alpha"), (5, "Alpha"), (10, "Alpha"), (20, "Beta")]);

    assert!(obs.handle_processed(&h).await.is_err());
}
