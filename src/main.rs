//! Understudy - background-agent pipeline for project activity
//!
//! The binary drives the library offline: it replays a recorded CSV of
//! context events through classification, transition detection, and the
//! managers, and offers small helpers for inspecting and editing the
//! per-project scratchpad database.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use understudy::{
    deploy::{DeployerConfig, TaskDeployer},
    scratchpad::Section,
    LlmService, ObserverConfig, ObserverMode, ProjectActivityObserver, RunContext, SettingsLoader,
    SqliteScratchpad, StateManager, TaskAgentManager, UiManager,
};

/// Default database path under the XDG data directory
fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("understudy")
        .join("scratchpad.db")
}

fn default_settings_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("understudy")
        .join("settings.yaml")
}

#[derive(Parser)]
#[command(name = "understudy", version, about = "Background-agent project activity pipeline")]
struct Cli {
    /// Path to the scratchpad database
    #[arg(long, env = "UNDERSTUDY_DB", global = true)]
    db: Option<PathBuf>,

    /// Path to the settings YAML file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter (overridden by RUST_LOG when set)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a CSV of context events through the full pipeline
    Run {
        /// Replay CSV (timestamp, context_update, propositions, calendar, objectives)
        csv: PathBuf,

        /// Do not sleep between events
        #[arg(long)]
        fast: bool,

        /// Seconds between events; defaults to the configured cooldown
        #[arg(long)]
        interval_seconds: Option<f64>,

        /// Report selected candidates without spawning execution agents
        #[arg(long)]
        no_deploy: bool,

        /// Stop after this many events
        #[arg(long)]
        max_steps: Option<usize>,

        /// Short profile of the user, passed to the proposal prompts
        #[arg(long, default_value = "")]
        user_profile: String,

        /// What the user wants background agents to focus on
        #[arg(long)]
        agent_goals: Option<String>,
    },

    /// Inspect and edit per-project scratchpads
    Scratchpad {
        #[command(subcommand)]
        command: ScratchpadCommand,
    },

    /// Manage known projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Subcommand)]
enum ScratchpadCommand {
    /// Print a project's rendered scratchpad
    Show { project: String },

    /// Append a line to a section
    Add {
        project: String,
        /// Section label; unknown labels fall back to Notes
        section: String,
        message: String,
        #[arg(long, default_value_t = 0)]
        confidence: i64,
    },

    /// Remove a line by its display index within a section
    Remove {
        project: String,
        section: String,
        index: usize,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List registered projects
    List,

    /// Register a project (or update its description)
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Enable the background agent for a project
    Enable { name: String },

    /// Disable the background agent for a project
    Disable { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let db_path = cli.db.clone().unwrap_or_else(default_db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(SqliteScratchpad::open(&db_path)?);

    match cli.command {
        Command::Run {
            csv,
            fast,
            interval_seconds,
            no_deploy,
            max_steps,
            user_profile,
            agent_goals,
        } => {
            let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
            let loader = SettingsLoader::new(&settings_path);
            let run_ctx = RunContext {
                user_profile,
                project_description: None,
                user_agent_goals: agent_goals,
            };
            run_replay(
                store, loader, &csv, fast, interval_seconds, no_deploy, max_steps, run_ctx,
            )
            .await
        }
        Command::Scratchpad { command } => scratchpad_command(&store, command),
        Command::Projects { command } => project_command(&store, command),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_replay(
    store: Arc<SqliteScratchpad>,
    loader: SettingsLoader,
    csv: &PathBuf,
    fast: bool,
    interval_seconds: Option<f64>,
    no_deploy: bool,
    max_steps: Option<usize>,
    run_ctx: RunContext,
) -> anyhow::Result<()> {
    let settings = loader.load();

    let known_projects = store.list_projects()?;
    if known_projects.is_empty() {
        warn!("no projects registered; everything will classify as the fallback project");
    }

    let llm = Arc::new(LlmService::with_default()?);

    let mut task_manager =
        TaskAgentManager::new(llm.clone(), store.clone(), loader.clone());
    if !no_deploy {
        task_manager = task_manager.with_deployer(TaskDeployer::new(DeployerConfig::default()));
    }

    let departure_config = ObserverConfig {
        mode: ObserverMode::Departure,
        min_entries_previous_segment: settings.departure_min_entries_previous_segment,
        time_threshold: settings.departure_time_threshold(),
        ..ObserverConfig::departure()
    };
    let arrival_config = ObserverConfig {
        mode: ObserverMode::Arrival,
        min_entries_current_segment: settings.arrival_min_entries_current_segment,
        time_threshold: settings.arrival_time_threshold(),
        ..ObserverConfig::arrival()
    };

    let mut departures = ProjectActivityObserver::new(departure_config, Arc::new(task_manager))
        .with_run_context(run_ctx.clone());
    let mut arrivals =
        ProjectActivityObserver::new(arrival_config, Arc::new(UiManager::new(store.clone())))
            .with_run_context(run_ctx);

    let mut state = StateManager::new(llm, known_projects);

    let events = understudy::replay::read_events(csv)?;
    info!("replaying {} events from {}", events.len(), csv.display());

    let interval = interval_seconds.unwrap_or(settings.observation_cooldown_seconds);
    let limit = max_steps.unwrap_or(usize::MAX);

    for (step, event) in events.iter().enumerate() {
        if step >= limit {
            info!("stopping after {} events (--max-steps)", step);
            break;
        }

        // a bad event should not end the replay; log it and move on
        if let Err(e) = state.process_event(event).await {
            warn!("event at {} failed: {}", event.timestamp, e);
            continue;
        }

        if let Some(report) = departures.handle_processed(state.history()).await? {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        if let Some(report) = arrivals.handle_processed(state.history()).await? {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        if !fast && interval > 0.0 {
            tokio::time::sleep(std::time::Duration::from_secs_f64(interval)).await;
        }
    }

    Ok(())
}

fn scratchpad_command(store: &SqliteScratchpad, command: ScratchpadCommand) -> anyhow::Result<()> {
    use understudy::ScratchpadStore;

    match command {
        ScratchpadCommand::Show { project } => {
            let rendered = store.render(&project)?;
            if rendered.is_empty() {
                println!("(empty scratchpad for {})", project);
            } else {
                print!("{}", rendered);
            }
        }
        ScratchpadCommand::Add {
            project,
            section,
            message,
            confidence,
        } => {
            let section = Section::normalize(&section);
            store.add_entry(&project, section, &message, confidence)?;
            println!("added to {}/{}", project, section);
        }
        ScratchpadCommand::Remove {
            project,
            section,
            index,
        } => {
            let section = Section::normalize(&section);
            if store.remove_entry(&project, section, index)? {
                println!("removed {}/{}[{}]", project, section, index);
            } else {
                println!("no entry at {}/{}[{}]", project, section, index);
            }
        }
    }
    Ok(())
}

fn project_command(store: &SqliteScratchpad, command: ProjectCommand) -> anyhow::Result<()> {
    use understudy::ScratchpadStore;

    match command {
        ProjectCommand::List => {
            for name in store.list_projects()? {
                let marker = if store.is_project_enabled(&name)? {
                    ""
                } else {
                    " (agent disabled)"
                };
                println!("{}{}", name, marker);
            }
        }
        ProjectCommand::Add { name, description } => {
            store.upsert_project(&name, &description, true)?;
            println!("registered {}", name);
        }
        ProjectCommand::Enable { name } => {
            store.set_enabled(&name, true)?;
            println!("agent enabled for {}", name);
        }
        ProjectCommand::Disable { name } => {
            store.set_enabled(&name, false)?;
            println!("agent disabled for {}", name);
        }
    }
    Ok(())
}
