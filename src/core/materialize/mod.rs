//! # Materialize Module
//!
//! Writes the selected photos to the output folder.
//!
//! Destinations are planned sequentially in rank order
//! ([`plan_copies`]), then copied in parallel ([`Materializer::execute`]).
//! Originals are never moved or modified.
//!
//! ## Naming
//! `{YYYY-MM-DD}_{lat_lon|NoLocation}_{parent folder}_{rank}{.ext}`, e.g.
//! `2024-06-01_51.50735_-0.12776_Beach_1.JPG`.

mod executor;
mod planner;
mod types;

pub use executor::Materializer;
pub use planner::{destination_name, plan_copies, relative_destination};
pub use types::{CopyFailure, MaterializeOutcome, OutputLayout, PlannedCopy};
