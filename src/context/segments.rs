//! Segment extraction over the classification history
//!
//! A segment is a maximal contiguous run of readings sharing one project,
//! scanned backward from the tail of the history. Segments are ephemeral:
//! they are recomputed on every observer invocation and never persisted.

use crate::context::history::ProjectReading;
use chrono::{DateTime, Utc};

/// A contiguous same-project run of readings
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Project shared by every reading in the run
    pub project: String,

    /// Timestamp of the earliest reading in the run
    pub start: DateTime<Utc>,

    /// Timestamp of the latest reading in the run
    pub end: DateTime<Utc>,

    /// Number of readings in the run
    pub count: usize,
}

/// Extract the current (tail-most) segment and the one immediately before it
///
/// `readings` are oldest first. Returns `None` for an empty slice. The
/// previous segment is `None` when the current segment spans the whole
/// retained window.
pub fn last_two_segments(readings: &[ProjectReading]) -> Option<(Segment, Option<Segment>)> {
    let mut idx = readings.len().checked_sub(1)?;

    let (current, rest) = scan_segment(readings, idx);
    idx = match rest {
        Some(i) => i,
        None => return Some((current, None)),
    };

    let (previous, _) = scan_segment(readings, idx);
    Some((current, Some(previous)))
}

/// Walk backward from `idx`, grouping readings that share the project at
/// `idx`. Returns the segment and the index just before it (None when the
/// segment reaches the head).
fn scan_segment(readings: &[ProjectReading], idx: usize) -> (Segment, Option<usize>) {
    let project = readings[idx].project.as_str();
    let end = readings[idx].timestamp;
    let mut start = readings[idx].timestamp;
    let mut count = 1;

    let mut i = idx;
    while i > 0 && readings[i - 1].project == project {
        i -= 1;
        start = readings[i].timestamp;
        count += 1;
    }

    let segment = Segment {
        project: project.to_string(),
        start,
        end,
        count,
    };
    (segment, i.checked_sub(1))
}

/// Timestamp of the most recent reading of `project` strictly before the
/// trailing `skip_tail` readings (the current segment)
///
/// Linear backward scan; windows are small (≤ the observer's `window_size`,
/// 20 by default), so no early-exit structure is kept around.
pub fn last_seen_before(
    readings: &[ProjectReading],
    skip_tail: usize,
    project: &str,
) -> Option<DateTime<Utc>> {
    let cutoff = readings.len().checked_sub(skip_tail)?;
    readings[..cutoff]
        .iter()
        .rev()
        .find(|r| r.project == project)
        .map(|r| r.timestamp)
}
