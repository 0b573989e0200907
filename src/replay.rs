//! CSV replay of recorded context events
//!
//! Lets the whole pipeline run offline against a recorded activity trace,
//! which is how the evaluation harness exercises it. One row per event;
//! objectives are `;`-separated within their column.

use crate::error::{Result, UnderstudyError};
use crate::types::ContextEvent;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ReplayRow {
    timestamp: String,
    context_update: String,
    #[serde(default)]
    recent_propositions: String,
    #[serde(default)]
    calendar_events: String,
    #[serde(default)]
    objectives: String,
}

/// Read a replay CSV into chronological context events
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<ContextEvent>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut events = Vec::new();

    for row in reader.deserialize() {
        let row: ReplayRow = row?;
        let timestamp = row
            .timestamp
            .parse::<DateTime<Utc>>()
            .map_err(|e| UnderstudyError::Other(format!("bad timestamp {:?}: {}", row.timestamp, e)))?;

        events.push(ContextEvent {
            timestamp,
            context_update: row.context_update,
            recent_propositions: row.recent_propositions,
            calendar_events: row.calendar_events,
            objectives: row
                .objectives
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            screenshot_path: None,
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_events() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "timestamp,context_update,recent_propositions,calendar_events,objectives"
        )
        .unwrap();
        writeln!(
            file,
            "2025-06-01T09:00:00Z,editing chapter 3,,,finish draft; collect citations"
        )
        .unwrap();
        writeln!(file, "2025-06-01T09:05:00Z,reviewing a PR,,,").unwrap();

        let events = read_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].objectives,
            vec!["finish draft".to_string(), "collect citations".to_string()]
        );
        assert!(events[1].objectives.is_empty());
        assert!(events[0].timestamp < events[1].timestamp);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "timestamp,context_update,recent_propositions,calendar_events,objectives"
        )
        .unwrap();
        writeln!(file, "yesterday,working,,,").unwrap();

        assert!(read_events(file.path()).is_err());
    }
}
