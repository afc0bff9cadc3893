//! # file-organizer CLI
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! file-organizer organize ~/Downloads --date-based
//! file-organizer watch ~/Downloads
//! ```

mod cli;

use file_organizer::Result;

fn main() -> Result<()> {
    file_organizer::init_tracing();
    cli::run()
}
