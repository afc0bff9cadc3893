//! # Error Module
//!
//! User-friendly error types for the file organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file errors are data** - they become progress events, not aborts

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Invalid root directory: {0}")]
    Path(#[from] PathError),

    #[error("Move failed: {0}")]
    Move(#[from] MoveError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Output error: {0}")]
    Output(String),
}

/// Errors about the root directory handed to the organizer or monitor
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Directory not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reading a file header for signature detection failed.
///
/// The classifier recovers from this locally and falls back to the
/// extension, so it never reaches callers of `classify`.
#[derive(Error, Debug)]
#[error("Could not read header of {path}: {source}")]
pub struct ClassificationError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors that occur while moving a single file
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Source file no longer exists: {path}")]
    SourceVanished { path: PathBuf },

    #[error("Destination is not writable: {path}")]
    DestinationNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File has no usable name: {path}")]
    InvalidSourceName { path: PathBuf },

    #[error("Failed to create folder {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Copied {source_path} to {destination} but could not remove the original ({reason}). \
         Both copies now exist."
    )]
    PartialMove {
        source_path: PathBuf,
        destination: PathBuf,
        reason: String,
    },

    #[error("Failed to move {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MoveError {
    /// Whether retrying the same move later might succeed.
    ///
    /// Only generic I/O failures qualify (a file still locked by its writer,
    /// for example). Missing sources and permission problems do not heal.
    pub fn is_transient(&self) -> bool {
        matches!(self, MoveError::Io { .. })
    }
}

/// Errors that occur while controlling the live monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Monitor is already running on {path}")]
    AlreadyRunning { path: PathBuf },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Failed to initialize watcher: {0}")]
    InitFailed(String),

    #[error("Failed to watch {path}: {reason}")]
    WatchFailed { path: PathBuf, reason: String },

    #[error("Failed to start monitor thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
