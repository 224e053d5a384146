//! Confkeep: Format-Preserving Configuration Persistence
//!
//! Reads flat (`key=value`) and sectioned (`[section]` / `key = value`)
//! configuration files into an ordered model, and writes a modified model back
//! while keeping comments, blank lines, spacing and quoting of every untouched
//! line. Files are replaced atomically through a temporary file and a rename.

pub mod document;
pub mod error;
pub mod logging;
pub mod merge;
pub mod model;
pub mod persist;
pub mod reader;
pub mod settings;
pub mod store;
pub mod tokenizer;

pub use error::{ConfError, SettingsError};
pub use model::{ConfigModel, Dialect};
pub use store::ConfigStore;
