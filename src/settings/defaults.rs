//! Defaults applied before any settings source is read.

use crate::persist::{DEFAULT_TEMP_PREFIX, OWNER_ONLY_MODE};
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Directory the flashcard application keeps its configuration in.
pub const DEFAULT_BASE_DIR: &str = "/etc/pfc";

/// Create a Config builder with engine defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("dialect", "flat")?
        .set_default("base_dir", DEFAULT_BASE_DIR)?
        .set_default("temp_prefix", DEFAULT_TEMP_PREFIX)?
        .set_default("default_mode", i64::from(OWNER_ONLY_MODE))
}
