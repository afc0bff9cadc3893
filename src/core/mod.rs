//! # Core Module
//!
//! The UI-agnostic organizing engine.
//!
//! ## Modules
//! - `classifier` - Decides a file's category from extension and content
//! - `scanner` - Lists the top-level files of a folder
//! - `resolver` - Maps a file to its destination folder
//! - `mover` - Moves files without overwriting anything
//! - `organize` - Runs the whole pipeline over a folder
//! - `monitor` - Organizes new files as they arrive

pub mod classifier;
pub mod monitor;
pub mod mover;
pub mod organize;
pub mod resolver;
pub mod scanner;

// Re-export commonly used types
pub use classifier::{Category, Classifier};
pub use monitor::{LiveMonitor, MonitorConfig};
pub use organize::{Organizer, OrganizerConfig, RunStatistics};
pub use resolver::{DestinationResolver, OrganizationPlan};
pub use scanner::FileEntry;
