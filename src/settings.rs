//! Engine settings
//!
//! Settings for a [`ConfigStore`](crate::store::ConfigStore) (dialect, base
//! directory, temporary-file prefix, default mode) and logging. Sources are
//! layered lowest to highest precedence: built-in defaults, the per-user settings
//! file, an explicitly given file, then `CONFKEEP_*` environment variables.

use crate::error::SettingsError;
use crate::logging::LoggingConfig;
use crate::model::Dialect;
use crate::persist::{DEFAULT_TEMP_PREFIX, OWNER_ONLY_MODE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod defaults;
mod sources;

pub use defaults::DEFAULT_BASE_DIR;
pub use sources::{user_settings_path, ENV_PREFIX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// File dialect, any case: `flat` (alias `shell`) or `sectioned` (alias `ini`)
    #[serde(default = "default_dialect")]
    pub dialect: Dialect,

    /// Directory configuration files are resolved against
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Prefix of temporary files written next to the target
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,

    /// Mode applied to files that did not exist before
    #[serde(default = "default_mode")]
    pub default_mode: u32,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_dialect() -> Dialect {
    Dialect::Flat
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

fn default_temp_prefix() -> String {
    DEFAULT_TEMP_PREFIX.to_string()
}

fn default_mode() -> u32 {
    OWNER_ONLY_MODE
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            base_dir: default_base_dir(),
            temp_prefix: default_temp_prefix(),
            default_mode: default_mode(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Loads [`StoreSettings`] from the layered sources.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from defaults, the user file, `explicit` (required when
    /// given) and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<StoreSettings, SettingsError> {
        let mut builder = defaults::builder_with_defaults()?;
        builder = sources::add_user_file(builder)?;
        if let Some(path) = explicit {
            builder = sources::add_file(builder, path, true);
        }
        builder = sources::add_environment(builder);

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Load settings from a single file on top of the defaults, ignoring the
    /// user file and the environment.
    pub fn load_from_file(path: &Path) -> Result<StoreSettings, SettingsError> {
        let builder = sources::add_file(defaults::builder_with_defaults()?, path, true);
        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
