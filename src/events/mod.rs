//! # Events Module
//!
//! Event-driven progress reporting for any front-end.
//!
//! ## Design
//! The core library hands events to an [`EventSink`], allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. A crossbeam
//! backed [`EventChannel`] is provided for the common case of a UI
//! thread draining events produced elsewhere.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::File(file) = event {
//!             println!("{} -> {:?}", file.filename, file.outcome);
//!         }
//!     }
//! });
//!
//! organizer.organize_with_events(root, false, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sink, EventChannel, EventReceiver, EventSender, EventSink};
pub use types::*;
