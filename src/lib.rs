//! # File Organizer
//!
//! Sorts the files of a folder into category subfolders, either once or
//! continuously as new files arrive.
//!
//! ## Core Philosophy
//! - **Never overwrite** - a name collision gets a numeric suffix
//! - **Look inside** - content signatures beat misleading extensions
//! - **Keep going** - one bad file is reported, the rest still get sorted
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Classification, destination resolution, moving, monitoring
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Verbosity comes from `RUST_LOG` and defaults to warnings. Calling it
/// twice is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
