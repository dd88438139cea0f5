//! # Events Module
//!
//! Progress reporting for the curation pipeline.
//!
//! The pipeline publishes typed events through a channel so any front end
//! (CLI progress bars, a GUI, a log sink) can follow a run without the core
//! knowing who is listening.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Analyze(AnalyzeEvent::Progress(p)) = event {
//!             println!("Analyzed {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
