//! downsort - tidy a folder by sorting its files into category subfolders
//!
//! This library organizes the immediate children of a directory (typically a
//! Downloads folder) into subfolders named after categories derived from each
//! file's extension. It supports dry-run simulation, collision-safe renaming,
//! TOML-based rule overrides, and a per-run textual report.

pub mod categories;
pub mod cli;
pub mod config;
pub mod organizer;
pub mod output;

pub use categories::CategoryMap;
pub use config::{CompiledRules, ConfigError, OrganizerConfig};
pub use organizer::{ErrorRecord, FolderOrganizer, MoveRecord, OrganizeError, OrganizeResult};

pub use cli::Args;
