//! Bounded alert history persisted as a JSON file.
//!
//! Persistence is best effort: load and save failures are logged and the
//! history keeps working in memory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rigel_core::alert::Alert;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Newest-first alert history backed by a file.
#[derive(Debug)]
pub struct AlertHistory {
    path: PathBuf,
    capacity: usize,
    entries: VecDeque<Alert>,
}

impl AlertHistory {
    /// Load the history at `path`. A missing, unreadable or corrupt file
    /// yields an empty history.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(HistoryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No alert history file yet");
                VecDeque::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not load alert history");
                VecDeque::new()
            }
        };
        entries.truncate(capacity);
        tracing::info!(path = %path.display(), count = entries.len(), "Alert history loaded");

        Self {
            path,
            capacity,
            entries,
        }
    }

    /// Prepend an alert and persist.
    pub fn record(&mut self, alert: Alert) {
        self.entries.push_front(alert);
        self.entries.truncate(self.capacity);
        self.save();
    }

    /// Write the history to disk, logging any failure.
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            tracing::warn!(path = %self.path.display(), error = %e, "Could not save alert history");
        }
    }

    fn try_save(&self) -> Result<(), HistoryError> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_entries(path: &Path) -> Result<VecDeque<Alert>, HistoryError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
