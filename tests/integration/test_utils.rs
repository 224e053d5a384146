//! Shared test utilities for integration tests
//!
//! Provides isolated configuration directories and serialized access to the
//! environment variables the settings loader reads.

use confkeep::{ConfigStore, Dialect};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        restore_var("HOME", self.home);
        restore_var("XDG_CONFIG_HOME", self.xdg_config_home);
    }
}

fn restore_var(name: &str, value: Option<String>) {
    match value {
        Some(orig) => std::env::set_var(name, orig),
        None => std::env::remove_var(name),
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir`.
///
/// The per-user settings file then resolves to
/// `<test_dir>/config/confkeep/confkeep.toml`.
pub fn with_config_home<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let config_home = test_dir.path().join("config");
    let home = test_dir.path().join("home");
    fs::create_dir_all(&config_home).unwrap();
    fs::create_dir_all(&home).unwrap();

    std::env::set_var("HOME", home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", config_home.to_str().unwrap());

    let result = f(&config_home);

    env_state.restore();
    result
}

/// Store rooted in a fresh temporary directory.
pub fn temp_store(dialect: Dialect) -> (TempDir, ConfigStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dialect, temp_dir.path());
    (temp_dir, store)
}

/// Write `content` to `name` inside the store's directory.
pub fn seed(store: &ConfigStore, name: &str, content: &str) -> PathBuf {
    let path = store.path_for(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn contents(store: &ConfigStore, name: &str) -> String {
    fs::read_to_string(store.path_for(name)).unwrap()
}
