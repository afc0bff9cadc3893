//! Event type definitions for progress reporting.

use crate::core::classifier::Category;
use crate::core::organize::RunStatistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// All events emitted by the organizer and the live monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch run events
    Run(RunEvent),
    /// One file was processed
    File(FileEvent),
    /// Live monitor lifecycle events
    Monitor(MonitorEvent),
}

/// Events bracketing a batch `organize` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RunEvent {
    /// A run has started
    Started {
        run_id: Uuid,
        root: PathBuf,
        date_based: bool,
    },
    /// A run completed (individual files may still have failed)
    Completed { run_id: Uuid, stats: RunStatistics },
}

/// Events from the live monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MonitorEvent {
    /// Monitoring started on a folder
    Started { path: PathBuf, date_based: bool },
    /// Monitoring stopped
    Stopped { path: PathBuf },
    /// The watcher backend reported an error; monitoring continues
    Error { message: String },
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum FileOutcome {
    /// The file now lives at `destination`
    Moved {
        destination: PathBuf,
        /// The move had to copy across volumes
        cross_volume: bool,
    },
    /// The file could not be organized; it was left where it was
    Failed,
}

/// Progress record for one processed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEvent {
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    /// Where the file was when processing began
    pub path: PathBuf,
    pub category: Category,
    pub size_bytes: u64,
    pub outcome: FileOutcome,
    /// Human-readable failure reason, if any
    pub detail: Option<String>,
}

impl FileEvent {
    pub fn moved(
        path: &Path,
        category: Category,
        size_bytes: u64,
        destination: PathBuf,
        cross_volume: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            filename: display_name(path),
            path: path.to_path_buf(),
            category,
            size_bytes,
            outcome: FileOutcome::Moved {
                destination,
                cross_volume,
            },
            detail: None,
        }
    }

    pub fn failed(path: &Path, category: Category, detail: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            filename: display_name(path),
            path: path.to_path_buf(),
            category,
            size_bytes: 0,
            outcome: FileOutcome::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Moved { .. })
    }

    /// Final location, if the file was moved
    pub fn destination(&self) -> Option<&Path> {
        match &self.outcome {
            FileOutcome::Moved { destination, .. } => Some(destination),
            FileOutcome::Failed => None,
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::File(FileEvent::moved(
            Path::new("/downloads/cat.png"),
            Category::Images,
            2048,
            PathBuf::from("/downloads/Images/cat.png"),
            false,
        ));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::File(file) => {
                assert_eq!(file.filename, "cat.png");
                assert_eq!(file.category, Category::Images);
                assert_eq!(
                    file.destination(),
                    Some(Path::new("/downloads/Images/cat.png"))
                );
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn failed_event_carries_detail() {
        let event = FileEvent::failed(
            Path::new("/downloads/gone.pdf"),
            Category::Documents,
            "Source file no longer exists",
        );
        assert!(!event.is_success());
        assert_eq!(event.filename, "gone.pdf");
        assert_eq!(
            event.detail.as_deref(),
            Some("Source file no longer exists")
        );
        assert!(event.destination().is_none());
    }

    #[test]
    fn outcome_is_tagged_in_json() {
        let json = serde_json::to_string(&FileOutcome::Failed).unwrap();
        assert_eq!(json, r#"{"status":"failed"}"#);
    }
}
