//! # photo-curate CLI
//!
//! Command-line interface for the photo curator.
//!
//! ## Usage
//! ```bash
//! photo-curate curate ~/Dump ~/Curated --per-event 5 --global-limit 150
//! photo-curate inspect ~/Dump/IMG_0042.JPG --output-format json
//! ```

mod cli;

use photo_curator::Result;

fn main() -> Result<()> {
    photo_curator::init_tracing();
    cli::run()
}
