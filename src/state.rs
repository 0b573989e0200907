//! Central, synchronous pipeline: context event → project → history
//!
//! The state manager is "LM-aware but not observer-aware": observation
//! sources produce [`ContextEvent`]s, this consumes them — classify the
//! event into a project, record the reading — and the transition observers
//! read the resulting history. One event is fully processed before the
//! next is accepted; nothing here is shared across tasks.

use crate::context::ProjectHistory;
use crate::error::Result;
use crate::services::{ClassifyRequest, ProjectClassifier};
use crate::types::{ContextEvent, ProcessedEvent};
use std::sync::Arc;
use tracing::{debug, info};

/// Number of prior predictions passed to the classifier for continuity
const CONTINUITY_WINDOW: usize = 5;

/// Owns the classification history and drives per-event processing
pub struct StateManager {
    history: ProjectHistory,
    classifier: Arc<dyn ProjectClassifier>,
    known_projects: Vec<String>,
}

impl StateManager {
    /// New state manager with a default-capacity history
    pub fn new(classifier: Arc<dyn ProjectClassifier>, known_projects: Vec<String>) -> Self {
        Self {
            history: ProjectHistory::default(),
            classifier,
            known_projects,
        }
    }

    /// Read access to the history for observers
    pub fn history(&self) -> &ProjectHistory {
        &self.history
    }

    /// Run one context event through classification and record the outcome
    ///
    /// Classifier errors propagate; the event is not recorded in that case.
    pub async fn process_event(&mut self, event: &ContextEvent) -> Result<ProcessedEvent> {
        debug!("processing context event at {}", event.timestamp);

        let recent_predictions: Vec<String> = self
            .history
            .recent(CONTINUITY_WINDOW)
            .into_iter()
            .map(|r| r.project)
            .collect();

        let project = self
            .classifier
            .classify(&ClassifyRequest {
                recent_objectives: event.objectives.join("\n"),
                recent_propositions: event.recent_propositions.clone(),
                calendar_events: event.calendar_events.clone(),
                recent_predictions,
                known_projects: self.known_projects.clone(),
            })
            .await?;

        self.history
            .append(event.timestamp, project.clone(), event.objectives.clone());

        info!(
            "event processed → project={} objectives={}",
            project,
            event.objectives.len()
        );
        Ok(ProcessedEvent {
            project,
            objectives: event.objectives.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    /// Classifier that answers from a scripted sequence
    struct ScriptedClassifier {
        answers: std::sync::Mutex<Vec<String>>,
        seen: std::sync::Mutex<Vec<ClassifyRequest>>,
    }

    #[async_trait]
    impl ProjectClassifier for ScriptedClassifier {
        async fn classify(&self, request: &ClassifyRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.answers.lock().unwrap().remove(0))
        }
    }

    fn event(minute: u32) -> ContextEvent {
        ContextEvent {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 9, minute, 0).unwrap(),
            context_update: "editing chapter 3".to_string(),
            recent_propositions: String::new(),
            calendar_events: String::new(),
            objectives: vec!["finish draft".to_string()],
            screenshot_path: None,
        }
    }

    #[tokio::test]
    async fn test_event_lands_in_history() {
        let classifier = Arc::new(ScriptedClassifier {
            answers: std::sync::Mutex::new(vec!["Thesis".to_string()]),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let mut state = StateManager::new(classifier, vec!["Thesis".to_string()]);

        let processed = state.process_event(&event(0)).await.unwrap();
        assert_eq!(processed.project, "Thesis");
        assert_eq!(state.history().last_project(), Some("Thesis"));
        assert_eq!(
            state.history().recent(1)[0].objectives,
            vec!["finish draft".to_string()]
        );
    }

    #[tokio::test]
    async fn test_classifier_sees_continuity_window() {
        let classifier = Arc::new(ScriptedClassifier {
            answers: std::sync::Mutex::new(vec![
                "Thesis".to_string(),
                "Thesis".to_string(),
                "Side Quest".to_string(),
            ]),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let mut state = StateManager::new(classifier.clone(), vec![]);

        for minute in 0..3 {
            state.process_event(&event(minute)).await.unwrap();
        }

        let seen = classifier.seen.lock().unwrap();
        assert!(seen[0].recent_predictions.is_empty());
        assert_eq!(seen[2].recent_predictions, vec!["Thesis", "Thesis"]);
    }
}
