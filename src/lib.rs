//! # Photo Curator
//!
//! Turns a large, unordered photo dump into a small, ranked, deduplicated
//! selection grouped by the day each photo was taken.
//!
//! ## Core Philosophy
//! - **Never touch originals** - photos are only ever copied
//! - **Reproducible** - the same input always yields the same selection,
//!   names and report
//! - **Auditable** - every copied photo, skipped duplicate and failure is
//!   recorded in the report
//!
//! ## Architecture
//! - `core` - The curation engine
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CuratorError, Result};

/// Initialize tracing for the library
///
/// Honors `RUST_LOG`, defaulting to warnings only. Should be called once by
/// the application entry point; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
