//! # Organize Module
//!
//! Batch organization of a folder's top-level files.
//!
//! For each file: classify, resolve the destination folder, create it if
//! needed and move the file there. Individual failures are reported and
//! counted; the run carries on.

mod organizer;
mod types;

pub(crate) use organizer::Attempt;
pub use organizer::Organizer;
pub use types::*;
