//! Output generation.
//!
//! # Submodules
//!
//! - [`terminal`]: plain-text rendering of headline lists and articles
//! - [`markdown`]: Markdown files for articles read with `read`
//! - [`json`]: JSON files for headline batches
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── 081502.json        # One headline batch
//!
//! markdown_output_dir/
//! └── bridge-reopens.md      # One read article
//! ```

pub mod json;
pub mod markdown;
pub mod terminal;
