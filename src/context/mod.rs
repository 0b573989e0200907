//! Recent-activity context: classification history and segment extraction
//!
//! Kept deliberately separate from the managers so that classification
//! components can write history, observers can read it without owning it,
//! and tests can construct a [`ProjectHistory`] and push entries directly.

pub mod history;
pub mod segments;

pub use history::{ProjectHistory, ProjectReading};
pub use segments::{last_seen_before, last_two_segments, Segment};
