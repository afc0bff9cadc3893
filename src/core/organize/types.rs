//! Types for the organize module.

use crate::core::classifier::Category;
use crate::events::{FileEvent, FileOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for batch organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Organize dotfiles like any other file
    pub include_hidden: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            include_hidden: true,
        }
    }
}

impl OrganizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip or include files whose name starts with a dot
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Whether a file with this name should be organized at all
    pub fn accepts(&self, file_name: &str) -> bool {
        self.include_hidden || !file_name.starts_with('.')
    }
}

/// Counters for one batch run, or for a stream of monitor events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub files_moved: usize,
    pub failures: usize,
    /// Successful moves per category
    pub by_category: BTreeMap<Category, usize>,
    pub bytes_moved: u64,
    pub size_by_category: BTreeMap<Category, u64>,
    /// Bytes moved to another volume, i.e. freed on the source volume
    pub cross_volume_bytes: u64,
    pub duration_ms: u64,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file event into the counters
    pub fn record(&mut self, event: &FileEvent) {
        match &event.outcome {
            FileOutcome::Moved { cross_volume, .. } => {
                self.files_moved += 1;
                *self.by_category.entry(event.category).or_insert(0) += 1;
                *self.size_by_category.entry(event.category).or_insert(0) += event.size_bytes;
                self.bytes_moved += event.size_bytes;
                if *cross_volume {
                    self.cross_volume_bytes += event.size_bytes;
                }
            }
            FileOutcome::Failed => self.failures += 1,
        }
    }

    /// Files seen, whether they moved or not
    pub fn files_processed(&self) -> usize {
        self.files_moved + self.failures
    }

    /// Number of files moved into `category`
    pub fn moved_into(&self, category: Category) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}
