//! # Pipeline Module
//!
//! Orchestrates a full curation run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Walk the input folder in sorted order
//! 2. **Fingerprint** - Digest every file; byte-identical copies are dropped,
//!    keeping the first one scanned
//! 3. **Analyze** - Capture date, location, quality score and subject match
//!    for each unique photo
//! 4. **Select** - Group by capture date, keep the best per event, then the
//!    best overall
//! 5. **Materialize** - Copy the selection under rank-based names
//! 6. **Report** - Write the audit trail atomically
//!
//! ## Parallelism
//! Stages 2, 3 and 5 run on a dedicated rayon pool sized by
//! [`CurationConfig::concurrency`]. The fingerprint registry is the only state
//! shared between workers.

mod config;
mod executor;

pub use config::{CurationConfig, CurationMode};
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};
