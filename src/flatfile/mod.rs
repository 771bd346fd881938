//! # Flat-file boundary
//!
//! The data directory doubles as a human-editable interchange format: one
//! markdown file per contributor (YAML frontmatter + bio body) and JSON dumps
//! of activities, aggregates, and badges. Import and export are inverses for
//! every structured field, so a round trip through the directory is lossless.

mod export;
mod import;

pub use export::export_all;
pub use import::import_all;

pub const CONTRIBUTORS_DIR: &str = "contributors";
pub const ACTIVITIES_FILE: &str = "activities.json";
pub const AGGREGATES_FILE: &str = "aggregates.json";
pub const BADGES_FILE: &str = "badges.json";

pub(crate) const FRONTMATTER_DELIMITER: &str = "---";
