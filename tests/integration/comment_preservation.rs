//! Untouched lines come back byte for byte.

use super::test_utils::{contents, seed, temp_store};
use confkeep::Dialect;

const FLAT: &str = "\
# Daemon settings
#   edited by hand

listen=0.0.0.0   # all interfaces
workers=4
  # indented note
log_file='/var/log/app.log'
verbose
";

const SECTIONED: &str = "\
# Scheduler
[review]
  new_per_day = 20   # cards
  ease = 2.5

# Display
[display]
theme = \"dark mode\"
";

#[test]
fn test_flat_unrelated_change_preserves_everything_else() {
    let (_dir, store) = temp_store(Dialect::Flat);
    seed(&store, "daemon.conf", FLAT);

    let mut model = store.read("daemon.conf").unwrap();
    model.set(None, "workers", Some("8".to_string())).unwrap();
    store.write("daemon.conf", &model).unwrap();

    assert_eq!(
        contents(&store, "daemon.conf"),
        FLAT.replace("workers=4", "workers=8")
    );
}

#[test]
fn test_sectioned_unrelated_change_preserves_everything_else() {
    let (_dir, store) = temp_store(Dialect::Sectioned);
    seed(&store, "sched.ini", SECTIONED);

    let mut model = store.read("sched.ini").unwrap();
    model
        .set(Some("review"), "ease", Some("2.7".to_string()))
        .unwrap();
    store.write("sched.ini", &model).unwrap();

    assert_eq!(
        contents(&store, "sched.ini"),
        SECTIONED.replace("ease = 2.5", "ease = 2.7")
    );
}

#[test]
fn test_unchanged_model_writes_identical_bytes() {
    let (_dir, store) = temp_store(Dialect::Flat);
    seed(&store, "daemon.conf", FLAT);

    let model = store.read("daemon.conf").unwrap();
    store.write("daemon.conf", &model).unwrap();

    assert_eq!(contents(&store, "daemon.conf"), FLAT);
}
