//! Write-then-read round trips and repeated writes through a `ConfigStore`.

use super::test_utils::{contents, seed, temp_store};
use confkeep::{ConfError, ConfigModel, ConfigStore, Dialect};
use std::fs;

#[test]
fn test_flat_model_round_trips_through_fresh_file() {
    let (_dir, store) = temp_store(Dialect::Flat);

    let mut model = store.new_config();
    model.set(None, "plain", Some("value".to_string())).unwrap();
    model.set(None, "spaced", Some("two words".to_string())).unwrap();
    model.set(None, "empty", Some(String::new())).unwrap();
    model.set(None, "quote", Some("it's \"here\"".to_string())).unwrap();
    model.set(None, "hash", Some("a#b".to_string())).unwrap();
    model.set(None, "bare", None).unwrap();
    store.write("fresh.conf", &model).unwrap();

    assert_eq!(store.read("fresh.conf").unwrap(), model);
}

#[test]
fn test_sectioned_model_round_trips_through_fresh_file() {
    let (_dir, store) = temp_store(Dialect::Sectioned);

    let mut model = store.new_config();
    model.set(Some("a"), "x", Some("1".to_string())).unwrap();
    model.set(Some("a"), "motto", Some("carpe diem".to_string())).unwrap();
    model.set(Some("a"), "padded", Some(" edge ".to_string())).unwrap();
    model.set(Some("b"), "flag", None).unwrap();
    model.set(Some("b"), "empty", Some(String::new())).unwrap();
    store.write("fresh.ini", &model).unwrap();

    assert_eq!(store.read("fresh.ini").unwrap(), model);
    assert!(contents(&store, "fresh.ini").contains("\n  empty =\n"));
}

#[test]
fn test_writing_twice_is_byte_identical() {
    let (_dir, store) = temp_store(Dialect::Sectioned);
    seed(&store, "app.ini", "# header\n[s]\nk = v # c\n");

    let mut model = store.read("app.ini").unwrap();
    model.set(Some("s"), "k", Some("w".to_string())).unwrap();
    model.set(Some("t"), "n", Some("1".to_string())).unwrap();

    store.write("app.ini", &model).unwrap();
    let first = contents(&store, "app.ini");
    store.write("app.ini", &model).unwrap();
    let second = contents(&store, "app.ini");

    assert_eq!(first, second);
    assert_eq!(first, "# header\n[s]\nk = w # c\n\n[t]\n  n = 1\n");
}

#[test]
fn test_missing_file_can_start_from_new_config() {
    let (_dir, store) = temp_store(Dialect::Flat);

    let err = store.read("absent.conf").unwrap_err();
    assert!(err.is_not_found());

    let mut model = store.read_or_new("absent.conf").unwrap();
    model.set(None, "created", Some("yes".to_string())).unwrap();
    store.write("absent.conf", &model).unwrap();
    assert_eq!(contents(&store, "absent.conf"), "created=yes\n");
}

#[test]
fn test_stores_are_independent_of_each_other() {
    let (dir_a, flat) = temp_store(Dialect::Flat);
    let sectioned = ConfigStore::new(Dialect::Sectioned, dir_a.path().join("ini"));
    fs::create_dir_all(sectioned.base_dir()).unwrap();

    let mut model = ConfigModel::new_sectioned();
    model.set(Some("s"), "k", Some("v".to_string())).unwrap();
    sectioned.write("same.name", &model).unwrap();

    assert!(flat.read("same.name").unwrap_err().is_not_found());
    assert_eq!(sectioned.read("same.name").unwrap(), model);
}

#[test]
fn test_find_first_candidate_paths() {
    let (dir, store) = temp_store(Dialect::Flat);
    let found = seed(&store, "found.conf", "");
    let candidates = format!(
        "{} {}",
        dir.path().join("missing.conf").display(),
        found.display()
    );

    assert_eq!(ConfigStore::find_first_file(&candidates), Some(found));
    assert_eq!(
        ConfigStore::find_first_dir(&format!("/definitely/not/here {}", dir.path().display())),
        Some(dir.path().to_path_buf())
    );
}

fn assert_invalid_entry(result: Result<(), ConfError>) {
    assert!(
        matches!(result, Err(ConfError::InvalidEntry { .. })),
        "expected InvalidEntry, got {:?}",
        result
    );
}

#[test]
fn test_line_break_in_value_is_refused_and_file_stays_usable() {
    let (_dir, store) = temp_store(Dialect::Flat);
    seed(&store, "app.conf", "# motd\nmotd=hello\n");

    let mut model = store.read("app.conf").unwrap();
    model
        .set(None, "motd", Some("line1\nline2".to_string()))
        .unwrap();
    assert_invalid_entry(store.write("app.conf", &model));
    assert_eq!(contents(&store, "app.conf"), "# motd\nmotd=hello\n");

    let mut model = store.read("app.conf").unwrap();
    model.set(None, "motd", Some("line1 line2".to_string())).unwrap();
    store.write("app.conf", &model).unwrap();
    assert_eq!(store.read("app.conf").unwrap(), model);
}

#[test]
fn test_carriage_return_in_key_or_section_is_refused() {
    let (_dir, flat) = temp_store(Dialect::Flat);
    let mut model = flat.new_config();
    model.set(None, "a\rb", Some("v".to_string())).unwrap();
    assert_invalid_entry(flat.write("app.conf", &model));
    assert!(!flat.path_for("app.conf").exists());

    let (_dir, sectioned) = temp_store(Dialect::Sectioned);
    let mut model = sectioned.new_config();
    model.set(Some("a\nb"), "k", Some("v".to_string())).unwrap();
    assert_invalid_entry(sectioned.write("app.ini", &model));
    assert!(!sectioned.path_for("app.ini").exists());
}

#[test]
fn test_empty_flat_key_is_refused() {
    let (_dir, store) = temp_store(Dialect::Flat);

    for value in [Some("v".to_string()), None] {
        let mut model = store.new_config();
        model.set(None, "ok", Some("1".to_string())).unwrap();
        model.set(None, "", value).unwrap();
        assert_invalid_entry(store.write("app.conf", &model));
    }
    assert!(!store.path_for("app.conf").exists());
}

#[test]
fn test_unrepresentable_sectioned_names_are_refused() {
    let (_dir, store) = temp_store(Dialect::Sectioned);
    seed(&store, "app.ini", "[keep]\nk = v\n");

    let cases: [(&str, &str); 6] = [
        ("user's", "k"),
        ("s", "it's"),
        ("s", "a#b"),
        (" pad ", "k"),
        ("s", "[x"),
        ("", "k"),
    ];
    for (section, key) in cases {
        let mut model = store.read("app.ini").unwrap();
        model.set(Some(section), key, Some("v".to_string())).unwrap();
        assert_invalid_entry(store.write("app.ini", &model));
        assert_eq!(contents(&store, "app.ini"), "[keep]\nk = v\n");
    }
}

#[test]
fn test_sectioned_names_with_inner_spaces_round_trip() {
    let (_dir, store) = temp_store(Dialect::Sectioned);

    let mut model = store.new_config();
    model
        .set(Some("my section"), "two words", Some("v".to_string()))
        .unwrap();
    store.write("app.ini", &model).unwrap();

    assert_eq!(store.read("app.ini").unwrap(), model);
}
