//! Observers that watch the classification history for transitions

pub mod transition;

pub use transition::{ObserverConfig, ObserverMode, ProjectActivityObserver};
