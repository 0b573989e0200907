//! Task-producing manager, triggered on departure
//!
//! Given a project name: reload settings, render the scratchpad, run the
//! proposal pipeline, score-and-select per the selection algorithm, and
//! optionally deploy execution agents for the selected candidates.

use crate::config::SettingsLoader;
use crate::deploy::TaskDeployer;
use crate::error::Result;
use crate::managers::{select_candidates, ProjectManager};
use crate::scratchpad::ScratchpadStore;
use crate::services::{ProposeRequest, TaskProposer};
use crate::types::{ProjectRunReport, RunContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates proposal, scoring, selection, and optional deployment
pub struct TaskAgentManager {
    proposer: Arc<dyn TaskProposer>,
    scratchpad: Arc<dyn ScratchpadStore>,
    settings: SettingsLoader,
    deployer: Option<TaskDeployer>,
}

impl TaskAgentManager {
    /// Manager without deployment (report-only)
    pub fn new(
        proposer: Arc<dyn TaskProposer>,
        scratchpad: Arc<dyn ScratchpadStore>,
        settings: SettingsLoader,
    ) -> Self {
        Self {
            proposer,
            scratchpad,
            settings,
            deployer: None,
        }
    }

    /// Enable spawning execution agents for selected candidates
    pub fn with_deployer(mut self, deployer: TaskDeployer) -> Self {
        self.deployer = Some(deployer);
        self
    }
}

#[async_trait]
impl ProjectManager for TaskAgentManager {
    async fn run_for_project(&self, project: &str, ctx: &RunContext) -> Result<ProjectRunReport> {
        info!("task manager: running for project {}", project);

        // per-project toggle: a disabled agent skips induction entirely
        if !self.scratchpad.is_project_enabled(project)? {
            info!(
                "task manager: project {} has agents disabled; skipping proposal",
                project
            );
            return Ok(ProjectRunReport::empty(project));
        }

        // always re-read settings so live YAML edits take effect this run
        let settings = self.settings.load();

        let scratchpad_text = self.scratchpad.render(project)?;
        if scratchpad_text.trim().is_empty() {
            warn!(
                "task manager: project {} has an empty scratchpad; skipping proposal",
                project
            );
            return Ok(ProjectRunReport::empty(project));
        }

        let project_description = match &ctx.project_description {
            Some(d) => Some(d.clone()),
            None => self.scratchpad.project_description(project)?,
        };

        let bundle = self
            .proposer
            .propose(&ProposeRequest {
                user_profile: ctx.user_profile.clone(),
                project_name: project.to_string(),
                project_scratchpad: scratchpad_text,
                project_description,
                user_agent_goals: ctx.user_agent_goals.clone(),
            })
            .await?;

        for a in &bundle.task_assessments {
            debug!(
                "task manager: task={:?} value={} safety={} feasibility={} align={}",
                a.task_description,
                a.value_score,
                a.safety_score,
                a.feasibility_score,
                a.user_preference_alignment_score
            );
        }

        let candidates = select_candidates(&bundle.task_assessments, &settings.selection);
        info!(
            "task manager: {} of {} assessments selected for {}",
            candidates.len(),
            bundle.task_assessments.len(),
            project
        );

        if let Some(deployer) = &self.deployer {
            if !candidates.is_empty() {
                deployer.deploy(project, &candidates)?;
            }
        }

        Ok(ProjectRunReport {
            project: project.to_string(),
            future_goals: bundle.future_goals,
            goal_to_milestones: bundle.goal_to_milestones,
            agent_tasks: bundle.agent_tasks,
            task_assessments: bundle.task_assessments,
            candidates,
            notification: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scratchpad::{Section, SqliteScratchpad};
    use crate::services::ProposalBundle;
    use crate::types::TaskAssessment;
    use std::sync::Mutex;

    /// Proposer returning a canned bundle and recording its inputs
    struct FakeProposer {
        bundle: ProposalBundle,
        requests: Mutex<Vec<ProposeRequest>>,
    }

    impl FakeProposer {
        fn new(bundle: ProposalBundle) -> Arc<Self> {
            Arc::new(Self {
                bundle,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TaskProposer for FakeProposer {
        async fn propose(&self, request: &ProposeRequest) -> Result<ProposalBundle> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.bundle.clone())
        }
    }

    fn assessment(desc: &str, value: u8, safety: u8) -> TaskAssessment {
        TaskAssessment {
            task_description: desc.to_string(),
            reasoning: String::new(),
            value_score: value,
            safety_score: safety,
            feasibility_score: 9,
            user_preference_alignment_score: 9,
        }
    }

    fn seeded_store(project: &str) -> Arc<SqliteScratchpad> {
        let store = SqliteScratchpad::in_memory().unwrap();
        store.upsert_project(project, "", true).unwrap();
        store
            .add_entry(project, Section::NextSteps, "do a thing", 5)
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_runs_pipeline_and_selects() {
        let bundle = ProposalBundle {
            agent_tasks: vec!["good".to_string(), "risky".to_string()],
            task_assessments: vec![assessment("good", 10, 10), assessment("risky", 10, 3)],
            ..Default::default()
        };
        let proposer = FakeProposer::new(bundle);
        let manager = TaskAgentManager::new(
            proposer.clone(),
            seeded_store("Sim Project"),
            SettingsLoader::defaults(),
        );

        let report = manager
            .run_for_project("Sim Project", &RunContext::default())
            .await
            .unwrap();

        assert_eq!(proposer.request_count(), 1);
        assert_eq!(report.project, "Sim Project");
        // all assessments come back unfiltered
        assert_eq!(report.task_assessments.len(), 2);
        // candidates filtered: the unsafe one is gone
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].assessment.task_description, "good");
    }

    #[tokio::test]
    async fn test_disabled_project_short_circuits() {
        let store = seeded_store("Paused");
        store.set_enabled("Paused", false).unwrap();
        let proposer = FakeProposer::new(ProposalBundle::default());
        let manager =
            TaskAgentManager::new(proposer.clone(), store, SettingsLoader::defaults());

        let report = manager
            .run_for_project("Paused", &RunContext::default())
            .await
            .unwrap();

        // no pipeline call, empty but well-formed report
        assert_eq!(proposer.request_count(), 0);
        assert_eq!(report.project, "Paused");
        assert!(report.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_empty_scratchpad_short_circuits() {
        let proposer = FakeProposer::new(ProposalBundle::default());
        let manager = TaskAgentManager::new(
            proposer.clone(),
            Arc::new(SqliteScratchpad::in_memory().unwrap()),
            SettingsLoader::defaults(),
        );

        let report = manager
            .run_for_project("Empty Project", &RunContext::default())
            .await
            .unwrap();

        assert_eq!(proposer.request_count(), 0);
        assert!(report.task_assessments.is_empty());
        assert!(report.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_scratchpad_description_fills_missing_context() {
        let store = SqliteScratchpad::in_memory().unwrap();
        store.upsert_project("Doc", "a described project", true).unwrap();
        store.add_entry("Doc", Section::Notes, "note", 0).unwrap();
        let proposer = FakeProposer::new(ProposalBundle::default());
        let manager = TaskAgentManager::new(
            proposer.clone(),
            Arc::new(store),
            SettingsLoader::defaults(),
        );

        manager
            .run_for_project("Doc", &RunContext::default())
            .await
            .unwrap();

        let requests = proposer.requests.lock().unwrap();
        assert_eq!(
            requests[0].project_description.as_deref(),
            Some("a described project")
        );
    }
}
