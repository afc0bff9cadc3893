//! # Scanner Module
//!
//! Lists the files sitting directly in a root folder.
//!
//! Only the top level is read: organized output lives in subfolders, so
//! repeated runs never pick up files that were already sorted.

use crate::core::classifier::extension_of;
use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Snapshot of a file taken when it was scanned.
///
/// The file may be moved or deleted by someone else before it is
/// organized; the snapshot is not refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Lowercase extension without the dot
    pub extension: Option<String>,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileEntry {
    /// Snapshot the metadata of a single file
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::with_metadata(path, &metadata))
    }

    fn with_metadata(path: &Path, metadata: &fs::Metadata) -> Self {
        Self {
            path: path.to_path_buf(),
            extension: extension_of(path),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    /// File name as text, for display and collision handling
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn is_hidden(&self) -> bool {
        self.file_name().starts_with('.')
    }
}

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to include dotfiles
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_hidden: true,
        }
    }
}

/// Check that `root` exists, is a directory and can be listed
pub fn validate_root(root: &Path) -> Result<(), PathError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PathError::NotFound {
            path: root.to_path_buf(),
        },
        _ => PathError::Unreadable {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(PathError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    fs::read_dir(root).map_err(|e| PathError::Unreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Regular files directly under `root`, in the order the filesystem lists them.
///
/// Subfolders and symlinks are skipped. Entries that vanish while being
/// listed are skipped as well.
pub fn scan_root(root: &Path, config: &ScanConfig) -> Result<Vec<FileEntry>, PathError> {
    validate_root(root)?;

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), error = %e, "entry vanished during scan");
                continue;
            }
        };

        let file = FileEntry::with_metadata(entry.path(), &metadata);
        if !config.include_hidden && file.is_hidden() {
            continue;
        }
        entries.push(file);
    }

    Ok(entries)
}
