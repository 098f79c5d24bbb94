//! JSON persistence of the learning table.
//!
//! Document layout:
//!
//! ```json
//! {"version": 1, "entries": [{"state": [0, 3, 1, -1, 10], "actions": {"0": 1.5, "2": -0.3}}]}
//! ```
//!
//! Action keys are table identifiers (`0` up, `1` right, `2` down, `3` left). Entries are
//! written in state order so saved files diff cleanly.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::observation::StateKey;
use super::q_table::LearningTable;
use super::types::{ActionId, Direction};

/// Current document version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed learning table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid action id {id} in state {state}")]
    InvalidAction { state: StateKey, id: ActionId },

    #[error("Non-finite value for {action} in state {state}")]
    NonFinite { state: StateKey, action: Direction },

    #[error("Unsupported table format version {found} (expected {})", FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct TableDocument {
    version: u32,
    entries: Vec<TableEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableEntry {
    state: StateKey,
    actions: BTreeMap<ActionId, f64>,
}

impl LearningTable {
    /// Serializes the table to a JSON string.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        let mut entries: Vec<TableEntry> = self
            .iter()
            .map(|(state, values)| TableEntry {
                state: state.clone(),
                actions: values.iter().map(|(dir, v)| (dir.id(), v)).collect(),
            })
            .collect();
        entries.sort_by(|a, b| a.state.cmp(&b.state));

        let doc = TableDocument {
            version: FORMAT_VERSION,
            entries,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parses and validates a table produced by [`LearningTable::to_json`].
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let doc: TableDocument = serde_json::from_str(json)?;
        if doc.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion { found: doc.version });
        }

        let mut table = LearningTable::new();
        for entry in doc.entries {
            for (id, value) in entry.actions {
                let Some(action) = Direction::from_id(id) else {
                    return Err(PersistenceError::InvalidAction {
                        state: entry.state,
                        id,
                    });
                };
                if !value.is_finite() {
                    return Err(PersistenceError::NonFinite {
                        state: entry.state,
                        action,
                    });
                }
                table.set(&entry.state, action, value);
            }
        }
        Ok(table)
    }

    /// Writes the table to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), states = self.len(), "learning table saved");
        Ok(())
    }

    /// Reads a table from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        info!(path = %path.display(), states = table.len(), "learning table loaded");
        Ok(table)
    }

    /// Reads a table from `path`, starting empty if it is missing or unreadable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => table,
            Err(PersistenceError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no saved learning table, starting empty");
                Self::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable learning table");
                Self::new()
            }
        }
    }
}
