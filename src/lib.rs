//! Understudy — background-agent project activity pipeline
//!
//! Watches a stream of classified activity observations, detects when the
//! user departs from or returns to a project, and turns those transitions
//! into background-agent work:
//!
//! - **Context**: ring-buffer history of project classifications and pure
//!   segment extraction over it
//! - **Observers**: debounced departure/arrival transition detection
//! - **Managers**: the task-producing manager (propose → score → select →
//!   deploy) and the UI notification manager, behind one dispatch trait
//! - **Services**: the LLM boundary (classification, task proposal) as
//!   traits so the deterministic core tests with fakes
//! - **Scratchpad**: the per-project persisted knowledge base
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use understudy::{
//!     LlmService, ObserverConfig, ProjectActivityObserver, SettingsLoader,
//!     SqliteScratchpad, StateManager, TaskAgentManager,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteScratchpad::open("scratchpad.db")?);
//!     let llm = Arc::new(LlmService::with_default()?);
//!     let manager = Arc::new(TaskAgentManager::new(
//!         llm.clone(),
//!         store,
//!         SettingsLoader::new("settings.yaml"),
//!     ));
//!     let mut state = StateManager::new(llm, vec!["Thesis".into()]);
//!     let mut departures =
//!         ProjectActivityObserver::new(ObserverConfig::departure(), manager);
//!
//!     for event in understudy::replay::read_events("trace.csv")? {
//!         state.process_event(&event).await?;
//!         departures.handle_processed(state.history()).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod managers;
pub mod observers;
pub mod replay;
pub mod scratchpad;
pub mod services;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use config::{SelectionSettings, Settings, SettingsLoader};
pub use context::{ProjectHistory, ProjectReading, Segment};
pub use error::{Result, UnderstudyError};
pub use managers::{select_candidates, ProjectManager, TaskAgentManager, UiManager};
pub use observers::{ObserverConfig, ObserverMode, ProjectActivityObserver};
pub use scratchpad::{ScratchpadStore, Section, SqliteScratchpad};
pub use services::{LlmConfig, LlmService, ProjectClassifier, TaskProposer};
pub use state::StateManager;
pub use types::{
    ContextEvent, Notification, ProjectRunReport, RunContext, ScoredCandidate, TaskAssessment,
    FALLBACK_PROJECT,
};
