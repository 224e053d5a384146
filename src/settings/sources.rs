//! Settings sources: the per-user settings file and `CONFKEEP_*` environment variables.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of environment variables read by the settings loader.
pub const ENV_PREFIX: &str = "CONFKEEP";

/// Path to the per-user settings file, e.g. `~/.config/confkeep/confkeep.toml`.
pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "confkeep").map(|dirs| dirs.config_dir().join("confkeep.toml"))
}

/// Add the per-user settings file to the builder if it exists.
pub fn add_user_file(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match user_settings_path() {
        Some(path) if path.is_file() => Ok(add_file(builder, &path, false)),
        Some(path) => {
            debug!(settings_path = %path.display(), "No user settings file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}

pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(File::from(path).required(required))
}

/// `CONFKEEP_BASE_DIR`, `CONFKEEP_LOGGING__LEVEL`, ...
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
