//! Property-based tests: writing the same model twice produces identical bytes

use super::round_trip::{flat_model, sectioned_model};
use confkeep::{ConfigModel, ConfigStore, Dialect};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use std::fs;
use tempfile::TempDir;

fn write_twice(dialect: Dialect, seed: &str, model: &ConfigModel) -> (String, String) {
    let temp_dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dialect, temp_dir.path());
    let path = store.path_for("target");
    fs::write(&path, seed).unwrap();

    store.write("target", model).unwrap();
    let first = fs::read_to_string(&path).unwrap();
    store.write("target", model).unwrap();
    let second = fs::read_to_string(&path).unwrap();
    (first, second)
}

/// Test that a second write of the same flat model is a no-op on content
#[test]
fn test_flat_write_idempotence_property() {
    let mut runner = TestRunner::new(Config::with_cases(64));

    runner
        .run(&flat_model(), |model| {
            let (first, second) =
                write_twice(Dialect::Flat, "# seeded\nold=1 # stale\nflag\n", &model);
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Test that a second write of the same sectioned model is a no-op on content
#[test]
fn test_sectioned_write_idempotence_property() {
    let mut runner = TestRunner::new(Config::with_cases(64));

    runner
        .run(&sectioned_model(), |model| {
            let (first, second) = write_twice(
                Dialect::Sectioned,
                "# seeded\n[a]\n  x = 1 # one\n\n[zz]\nflag\n",
                &model,
            );
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}

/// Test that comment-only lines before the first entry survive any flat merge
#[test]
fn test_leading_comment_preserved_property() {
    let mut runner = TestRunner::new(Config::with_cases(64));

    runner
        .run(&flat_model(), |model| {
            let (first, _) = write_twice(Dialect::Flat, "# seeded\nold=1 # stale\n", &model);
            prop_assert!(first.starts_with("# seeded\n"));
            Ok(())
        })
        .unwrap();
}
