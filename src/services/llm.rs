//! LLM service for classification and task proposal
//!
//! Implements the [`ProjectClassifier`] and [`TaskProposer`] seams against
//! the Anthropic messages API. Responses use a rigid line format that the
//! parsers below extract without any grammar machinery. No retries or
//! backpressure here; callers own that policy.

use crate::error::{Result, UnderstudyError};
use crate::services::{
    ClassifyRequest, ProjectClassifier, ProposalBundle, ProposeRequest, TaskProposer,
};
use crate::types::{TaskAssessment, FALLBACK_PROJECT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use tracing::{debug, warn};

/// Configuration for the LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Anthropic API key
    pub api_key: String,

    /// Model to use
    pub model: String,

    /// Max tokens for responses
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            model: "claude-3-5-haiku-20241022".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// LLM-backed classifier and task proposer
pub struct LlmService {
    config: LlmConfig,
    client: reqwest::Client,
}

/// Anthropic API message format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    text: String,
}

impl LlmService {
    /// Create a new LLM service with custom config
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(UnderstudyError::Config(
                "ANTHROPIC_API_KEY not set".to_string(),
            ));
        }

        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Create with default config
    pub fn with_default() -> Result<Self> {
        Self::new(LlmConfig::default())
    }

    async fn call_api(&self, prompt: &str) -> Result<String> {
        debug!("Calling Anthropic API");

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(UnderstudyError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(UnderstudyError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: AnthropicResponse = response.json().await?;
        body.content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| UnderstudyError::LlmApi("Empty response content".to_string()))
    }
}

#[async_trait]
impl ProjectClassifier for LlmService {
    async fn classify(&self, request: &ClassifyRequest) -> Result<String> {
        let prompt = format!(
            r#"You are classifying which of the user's projects their current activity belongs to.

Known projects (you MUST answer with exactly one of these, or "{fallback}" if none fits):
{projects}

Recent inferred objectives:
{objectives}

Recent behavioral propositions:
{propositions}

Calendar events:
{calendar}

Recent project predictions (oldest first, for continuity):
{predictions}

Respond with EXACTLY one line:
PROJECT: <project name>
"#,
            fallback = FALLBACK_PROJECT,
            projects = request.known_projects.join("\n"),
            objectives = request.recent_objectives,
            propositions = request.recent_propositions,
            calendar = request.calendar_events,
            predictions = request.recent_predictions.join("\n"),
        );

        let response = self.call_api(&prompt).await?;
        let name = extract_field(&response, "PROJECT:")?;

        // clamp anything outside the configured set to the fallback sentinel
        if request.known_projects.iter().any(|p| p == &name) || name == FALLBACK_PROJECT {
            Ok(name)
        } else {
            warn!(
                "classifier returned unknown project {:?}; falling back to {}",
                name, FALLBACK_PROJECT
            );
            Ok(FALLBACK_PROJECT.to_string())
        }
    }
}

#[async_trait]
impl TaskProposer for LlmService {
    async fn propose(&self, request: &ProposeRequest) -> Result<ProposalBundle> {
        // stage 1: goals, milestones, tasks
        let structure_prompt = format!(
            r#"You are proposing background-agent work for one of the user's projects.

User profile: {profile}
Project: {project}
Project description: {description}
User's goals for background agents: {agent_goals}

Project scratchpad:
{scratchpad}

First induce 1-3 plausible future goals for this project, then 1-3 milestones
per goal, then 1-5 concrete tasks a background agent could do autonomously.

Format EXACTLY as (one item per line, in this order):
GOAL: <goal>
MILESTONE: <goal> :: <milestone>
TASK: <task description>
"#,
            profile = request.user_profile,
            project = request.project_name,
            description = request.project_description.as_deref().unwrap_or(""),
            agent_goals = request.user_agent_goals.as_deref().unwrap_or(""),
            scratchpad = request.project_scratchpad,
        );

        let structure = self.call_api(&structure_prompt).await?;
        let (future_goals, goal_to_milestones, agent_tasks) = parse_structure(&structure);

        if agent_tasks.is_empty() {
            debug!("proposer produced no tasks for {}", request.project_name);
            return Ok(ProposalBundle {
                future_goals,
                goal_to_milestones,
                agent_tasks,
                task_assessments: Vec::new(),
            });
        }

        // stage 2: batch-score the proposed tasks
        let task_list: Vec<String> = agent_tasks
            .iter()
            .enumerate()
            .map(|(i, t)| format!("[{}] {}", i, t))
            .collect();

        let scoring_prompt = format!(
            r#"You are scoring a set of candidate background-agent tasks for a single project.

User profile: {profile}
Project: {project}
Project scratchpad:
{scratchpad}

Tasks:
{tasks}

For each task produce four independent integer scores in [0, 10]:
value (advances the project's high-level goals), safety (10 = no side
effects, reversible), feasibility (agent can actually do it with the
context available), alignment (matches the user's stated preferences).
Think through a short reasoning before the scores. Be conservative when
unsure.

Format EXACTLY as one block per task:
TASK: <task description copied verbatim>
REASONING: <a few sentences on one line>
VALUE: <0-10>
SAFETY: <0-10>
FEASIBILITY: <0-10>
ALIGNMENT: <0-10>
"#,
            profile = request.user_profile,
            project = request.project_name,
            scratchpad = request.project_scratchpad,
            tasks = task_list.join("\n"),
        );

        let scored = self.call_api(&scoring_prompt).await?;
        let task_assessments = parse_assessments(&scored);

        Ok(ProposalBundle {
            future_goals,
            goal_to_milestones,
            agent_tasks,
            task_assessments,
        })
    }
}

/// Extract the value of a `FIELD:`-prefixed line
fn extract_field(response: &str, field: &str) -> Result<String> {
    response
        .lines()
        .find_map(|line| line.trim().strip_prefix(field))
        .map(|s| s.trim().to_string())
        .ok_or_else(|| UnderstudyError::LlmResponse(format!("missing field: {}", field)))
}

/// Parse the GOAL/MILESTONE/TASK line format from the structure stage
fn parse_structure(
    response: &str,
) -> (Vec<String>, BTreeMap<String, Vec<String>>, Vec<String>) {
    let mut goals = Vec::new();
    let mut milestones: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut tasks = Vec::new();

    for line in response.lines() {
        let line = line.trim();
        if let Some(goal) = line.strip_prefix("GOAL:") {
            let goal = goal.trim();
            if !goal.is_empty() {
                goals.push(goal.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("MILESTONE:") {
            if let Some((goal, milestone)) = rest.split_once("::") {
                let (goal, milestone) = (goal.trim(), milestone.trim());
                if !goal.is_empty() && !milestone.is_empty() {
                    milestones
                        .entry(goal.to_string())
                        .or_default()
                        .push(milestone.to_string());
                }
            }
        } else if let Some(task) = line.strip_prefix("TASK:") {
            let task = task.trim();
            if !task.is_empty() {
                tasks.push(task.to_string());
            }
        }
    }

    (goals, milestones, tasks)
}

/// Parse per-task assessment blocks from the scoring stage
///
/// Blocks with missing or unparseable scores are dropped with a warning
/// rather than failing the whole batch.
fn parse_assessments(response: &str) -> Vec<TaskAssessment> {
    let mut assessments = Vec::new();
    let mut current: Option<PartialAssessment> = None;

    for line in response.lines() {
        let line = line.trim();
        if let Some(task) = line.strip_prefix("TASK:") {
            if let Some(partial) = current.take() {
                finish_block(partial, &mut assessments);
            }
            current = Some(PartialAssessment::new(task.trim()));
        } else if let Some(partial) = current.as_mut() {
            if let Some(v) = line.strip_prefix("REASONING:") {
                partial.reasoning = v.trim().to_string();
            } else if let Some(v) = line.strip_prefix("VALUE:") {
                partial.value = parse_score(v);
            } else if let Some(v) = line.strip_prefix("SAFETY:") {
                partial.safety = parse_score(v);
            } else if let Some(v) = line.strip_prefix("FEASIBILITY:") {
                partial.feasibility = parse_score(v);
            } else if let Some(v) = line.strip_prefix("ALIGNMENT:") {
                partial.alignment = parse_score(v);
            }
        }
    }
    if let Some(partial) = current.take() {
        finish_block(partial, &mut assessments);
    }

    assessments
}

struct PartialAssessment {
    task: String,
    reasoning: String,
    value: Option<u8>,
    safety: Option<u8>,
    feasibility: Option<u8>,
    alignment: Option<u8>,
}

impl PartialAssessment {
    fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            reasoning: String::new(),
            value: None,
            safety: None,
            feasibility: None,
            alignment: None,
        }
    }
}

fn finish_block(partial: PartialAssessment, out: &mut Vec<TaskAssessment>) {
    match (
        partial.value,
        partial.safety,
        partial.feasibility,
        partial.alignment,
    ) {
        (Some(value), Some(safety), Some(feasibility), Some(alignment)) => {
            out.push(TaskAssessment {
                task_description: partial.task,
                reasoning: partial.reasoning,
                value_score: value,
                safety_score: safety,
                feasibility_score: feasibility,
                user_preference_alignment_score: alignment,
            });
        }
        _ => warn!(
            "dropping assessment block with missing scores for task {:?}",
            partial.task
        ),
    }
}

fn parse_score(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().map(|v| v.min(10))
}
