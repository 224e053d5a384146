//! Layered settings: defaults, per-user file, explicit file, environment.

use super::test_utils::with_config_home;
use confkeep::settings::{user_settings_path, SettingsLoader};
use confkeep::{ConfigStore, Dialect};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_file() {
    let test_dir = TempDir::new().unwrap();
    let settings = with_config_home(&test_dir, |_| SettingsLoader::load(None).unwrap());

    assert_eq!(settings.dialect, Dialect::Flat);
    assert_eq!(settings.base_dir, PathBuf::from("/etc/pfc"));
    assert_eq!(settings.temp_prefix, "aa_temp");
}

#[test]
fn test_user_file_is_picked_up() {
    let test_dir = TempDir::new().unwrap();
    let settings = with_config_home(&test_dir, |config_home| {
        let path = user_settings_path().unwrap();
        assert!(path.starts_with(config_home));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "dialect = \"sectioned\"\ntemp_prefix = \"user_tmp\"\n").unwrap();
        SettingsLoader::load(None).unwrap()
    });

    assert_eq!(settings.dialect, Dialect::Sectioned);
    assert_eq!(settings.temp_prefix, "user_tmp");
}

#[test]
fn test_explicit_file_overrides_user_file() {
    let test_dir = TempDir::new().unwrap();
    let explicit = test_dir.path().join("explicit.toml");
    fs::write(&explicit, "base_dir = \"/srv/explicit\"\n").unwrap();

    let settings = with_config_home(&test_dir, |_| {
        let path = user_settings_path().unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "base_dir = \"/srv/user\"\ndialect = \"ini\"\n").unwrap();
        SettingsLoader::load(Some(&explicit)).unwrap()
    });

    assert_eq!(settings.base_dir, PathBuf::from("/srv/explicit"));
    assert_eq!(settings.dialect, Dialect::Sectioned);
}

#[test]
fn test_store_built_from_loaded_settings_writes_files() {
    let test_dir = TempDir::new().unwrap();
    let data_dir = test_dir.path().join("cfg");
    fs::create_dir_all(&data_dir).unwrap();
    let explicit = test_dir.path().join("explicit.toml");
    fs::write(
        &explicit,
        format!("dialect = \"shell\"\nbase_dir = {:?}\n", data_dir.to_str().unwrap()),
    )
    .unwrap();

    let settings = SettingsLoader::load_from_file(&explicit).unwrap();
    let store = ConfigStore::from_settings(&settings);

    let mut model = store.new_config();
    model.set(None, "k", Some("v".to_string())).unwrap();
    store.write("app.conf", &model).unwrap();
    assert_eq!(fs::read_to_string(data_dir.join("app.conf")).unwrap(), "k=v\n");
}
