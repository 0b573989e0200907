//! Background execution-agent deployment
//!
//! Fire-and-forget: each selected candidate gets its own detached agent
//! process, with stdout/stderr appended to a timestamped per-run log file
//! under the user data directory. The core never awaits the agent; spawn
//! failures are logged and skipped, never fatal to the manager run.

use crate::error::Result;
use crate::types::ScoredCandidate;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Deployment configuration
#[derive(Debug, Clone)]
pub struct DeployerConfig {
    /// Program to run for each candidate
    pub program: String,

    /// Arguments placed before the `--project`/`--task` pair
    pub base_args: Vec<String>,

    /// Directory for per-process log files; defaults to
    /// `<user data dir>/understudy/logs`
    pub logs_dir: PathBuf,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("understudy");
        Self {
            program: "understudy-agent".to_string(),
            base_args: Vec::new(),
            logs_dir: data_dir.join("logs"),
        }
    }
}

/// Spawns detached execution agents for selected candidates
pub struct TaskDeployer {
    config: DeployerConfig,
}

impl TaskDeployer {
    /// Deployer with the given configuration
    pub fn new(config: DeployerConfig) -> Self {
        Self { config }
    }

    /// Spawn one detached agent process per candidate
    ///
    /// Returns the number of processes actually spawned. Candidates with
    /// empty task descriptions are skipped.
    pub fn deploy(&self, project: &str, candidates: &[ScoredCandidate]) -> Result<usize> {
        std::fs::create_dir_all(&self.config.logs_dir)?;

        let mut spawned = 0;
        for candidate in candidates {
            let task = candidate.assessment.task_description.trim();
            if task.is_empty() {
                continue;
            }

            match self.spawn_one(project, task) {
                Ok(log_path) => {
                    info!(
                        "deployed agent for project={:?} task={:?} log={}",
                        project,
                        task,
                        log_path.display()
                    );
                    spawned += 1;
                }
                Err(e) => {
                    warn!("failed to spawn agent for task {:?}: {}", task, e);
                }
            }
        }
        Ok(spawned)
    }

    fn spawn_one(&self, project: &str, task: &str) -> Result<PathBuf> {
        let log_path = self.config.logs_dir.join(format!(
            "{}_{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            &uuid::Uuid::new_v4().simple().to_string()[..4]
        ));
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        let log_file_err = log_file.try_clone()?;

        // detached: the child outlives this process; we never wait on it
        let child = Command::new(&self.config.program)
            .args(&self.config.base_args)
            .arg("--project")
            .arg(project)
            .arg("--task")
            .arg(task)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_err))
            .spawn()?;
        drop(child);

        Ok(log_path)
    }
}
