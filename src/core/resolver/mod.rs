//! # Resolver Module
//!
//! Works out which folder a file belongs in.
//!
//! ## Layout
//! - Type mode: `<root>/<Category>/`
//! - Date mode: `<root>/<Category>/<YYYY>/<MM>/`, from the file's
//!   modification time in local time
//!
//! Folders are only created by [`DestinationResolver::prepare`], which the
//! organizer calls right before a move, so categories without files never
//! get a folder.

use crate::core::classifier::Category;
use crate::core::mover::unique_destination;
use crate::core::scanner::FileEntry;
use crate::error::MoveError;
use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where a file is going to go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationPlan {
    pub source: FileEntry,
    pub category: Category,
    pub destination_dir: PathBuf,
    /// Equal to the source name unless that name is already taken
    pub destination_name: String,
}

impl OrganizationPlan {
    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.destination_name)
    }

    /// Whether the file had to be renamed to avoid a collision
    pub fn is_renamed(&self) -> bool {
        self.destination_name != self.source.file_name()
    }
}

/// Maps (file, category, date mode) to a destination folder under a root
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    root: PathBuf,
}

impl DestinationResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination folder for `entry`. Pure; touches nothing on disk.
    pub fn resolve(&self, entry: &FileEntry, category: Category, date_based: bool) -> PathBuf {
        let category_dir = self.root.join(category.dir_name());
        if date_based {
            category_dir.join(date_folder(entry.modified))
        } else {
            category_dir
        }
    }

    /// Create `dir` (and parents) if missing. Creating an existing folder is fine.
    pub fn prepare(&self, dir: &Path) -> Result<(), MoveError> {
        fs::create_dir_all(dir).map_err(|e| MoveError::CreateDirectory {
            path: dir.to_path_buf(),
            source: e,
        })
    }

    /// Build a plan for `entry` without touching the filesystem.
    ///
    /// The destination name accounts for files already on disk, so it is
    /// what a move performed right now would produce.
    pub fn plan(&self, entry: &FileEntry, category: Category, date_based: bool) -> OrganizationPlan {
        self.plan_avoiding(entry, category, date_based, &HashSet::new())
    }

    /// Like [`plan`](Self::plan), but also treats `reserved` paths as taken.
    /// Used to keep the targets of a multi-file preview distinct.
    pub fn plan_avoiding(
        &self,
        entry: &FileEntry,
        category: Category,
        date_based: bool,
        reserved: &HashSet<PathBuf>,
    ) -> OrganizationPlan {
        let destination_dir = self.resolve(entry, category, date_based);
        let name = entry.file_name();
        let destination_name =
            unique_destination(&destination_dir, &name, |p| reserved.contains(p) || p.exists())
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(name);

        OrganizationPlan {
            source: entry.clone(),
            category,
            destination_dir,
            destination_name,
        }
    }
}

/// `YYYY/MM` in local time
fn date_folder(modified: SystemTime) -> PathBuf {
    let date: DateTime<Local> = modified.into();
    PathBuf::from(format!("{:04}", date.year())).join(format!("{:02}", date.month()))
}
