//! SQLite-backed scratchpad store
//!
//! One row per scratchpad line. Rows carry a stable internal id, but users
//! and the LLM address lines by display index within a section ("edit Notes
//! index 2"), so the index-based helpers resolve (project, section, index)
//! to the underlying row. Display indices are 0-based in insertion order
//! and compact after removals.

use crate::error::Result;
use crate::scratchpad::{ScratchpadStore, Section};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// One scratchpad line
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchpadEntry {
    /// Internal row id (stable across index shifts)
    pub id: i64,
    /// Section the line belongs to
    pub section: Section,
    /// Line content
    pub message: String,
    /// Classifier/updater confidence in the line, 0-10
    pub confidence: i64,
}

/// SQLite scratchpad store
///
/// The connection sits behind a mutex so the store satisfies `Send + Sync`
/// for the manager seam; access is sequential in practice.
pub struct SqliteScratchpad {
    conn: Mutex<Connection>,
}

impl SqliteScratchpad {
    /// Open (and initialize) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store, for tests and ephemeral runs
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                name TEXT PRIMARY KEY,
                description TEXT NOT NULL DEFAULT '',
                agent_enabled INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS scratchpad_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_name TEXT NOT NULL,
                section TEXT NOT NULL,
                message TEXT NOT NULL,
                confidence INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_entries_project_section
                ON scratchpad_entries (project_name, section, id);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // a poisoned lock means a previous panic mid-statement; propagating
        // the panic is the only sane option for a local store
        self.conn.lock().expect("scratchpad connection poisoned")
    }

    /// Register or update a project's metadata
    pub fn upsert_project(&self, name: &str, description: &str, enabled: bool) -> Result<()> {
        self.lock().execute(
            "INSERT INTO projects (name, description, agent_enabled) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET description = ?2, agent_enabled = ?3",
            params![name, description, enabled as i64],
        )?;
        Ok(())
    }

    /// Toggle the background-agent feature for a project
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.upsert_project_enabled_only(name, enabled)
    }

    fn upsert_project_enabled_only(&self, name: &str, enabled: bool) -> Result<()> {
        self.lock().execute(
            "INSERT INTO projects (name, agent_enabled) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET agent_enabled = ?2",
            params![name, enabled as i64],
        )?;
        Ok(())
    }

    /// Names of all registered projects, sorted
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT name FROM projects ORDER BY name ASC")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Append a line to a project's scratchpad, returning its row id
    pub fn add_entry(
        &self,
        project: &str,
        section: Section,
        message: &str,
        confidence: i64,
    ) -> Result<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO scratchpad_entries (project_name, section, message, confidence)
             VALUES (?1, ?2, ?3, ?4)",
            params![project, section.as_str(), message, confidence],
        )?;
        let id = conn.last_insert_rowid();
        debug!("scratchpad: added entry {} to {}/{}", id, project, section);
        Ok(id)
    }

    /// All lines in one section, display order
    pub fn list_entries(&self, project: &str, section: Section) -> Result<Vec<ScratchpadEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, section, message, confidence FROM scratchpad_entries
             WHERE project_name = ?1 AND section = ?2 ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![project, section.as_str()], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Replace the message of the line at `display_index` within a section
    pub fn update_entry(
        &self,
        project: &str,
        section: Section,
        display_index: usize,
        message: &str,
    ) -> Result<bool> {
        let Some(id) = self.resolve_index(project, section, display_index)? else {
            return Ok(false);
        };
        self.lock().execute(
            "UPDATE scratchpad_entries SET message = ?1 WHERE id = ?2",
            params![message, id],
        )?;
        Ok(true)
    }

    /// Remove the line at `display_index`; later indices shift down
    pub fn remove_entry(
        &self,
        project: &str,
        section: Section,
        display_index: usize,
    ) -> Result<bool> {
        let Some(id) = self.resolve_index(project, section, display_index)? else {
            return Ok(false);
        };
        self.lock()
            .execute("DELETE FROM scratchpad_entries WHERE id = ?1", params![id])?;
        Ok(true)
    }

    fn resolve_index(
        &self,
        project: &str,
        section: Section,
        display_index: usize,
    ) -> Result<Option<i64>> {
        let conn = self.lock();
        let id = conn
            .query_row(
                "SELECT id FROM scratchpad_entries
                 WHERE project_name = ?1 AND section = ?2
                 ORDER BY id ASC LIMIT 1 OFFSET ?3",
                params![project, section.as_str(), display_index as i64],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }
}

fn row_to_entry(row: &Row) -> rusqlite::Result<ScratchpadEntry> {
    let section: String = row.get("section")?;
    Ok(ScratchpadEntry {
        id: row.get("id")?,
        section: Section::normalize(&section),
        message: row.get("message")?,
        confidence: row.get("confidence")?,
    })
}

impl ScratchpadStore for SqliteScratchpad {
    fn is_project_enabled(&self, project: &str) -> Result<bool> {
        let conn = self.lock();
        let enabled = conn
            .query_row(
                "SELECT agent_enabled FROM projects WHERE name = ?1",
                params![project],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        // unknown projects default to enabled
        Ok(enabled.map_or(true, |v| v != 0))
    }

    fn project_description(&self, project: &str) -> Result<Option<String>> {
        let conn = self.lock();
        let description = conn
            .query_row(
                "SELECT description FROM projects WHERE name = ?1",
                params![project],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(description.filter(|d| !d.trim().is_empty()))
    }

    fn render(&self, project: &str) -> Result<String> {
        let mut out = String::new();
        for section in Section::ALL {
            let entries = self.list_entries(project, section)?;
            if entries.is_empty() {
                continue;
            }
            if out.is_empty() {
                out.push_str(&format!("# Project: {}\n", project));
                if let Some(description) = self.project_description(project)? {
                    out.push_str(&format!("Description: {}\n", description));
                }
            }
            out.push_str(&format!("\n## {}\n", section));
            for (idx, entry) in entries.iter().enumerate() {
                out.push_str(&format!(
                    "[{}] {} (confidence: {})\n",
                    idx, entry.message, entry.confidence
                ));
            }
        }
        Ok(out)
    }

    fn has_pending_reviewable_items(&self, project: &str) -> Result<bool> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM scratchpad_entries
             WHERE project_name = ?1 AND section = ?2",
            params![project, Section::PendingReview.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
