//! End-to-end tests for the `fkdiff` binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const BEFORE: &str = r#"{
    "tables": [
        {
            "name": "table",
            "columns": [
                {"name": "id", "data_type": "INTEGER", "primary_key": true},
                {"name": "test", "data_type": "VARCHAR(10)"}
            ]
        },
        {
            "name": "user",
            "columns": [
                {"name": "id", "data_type": "INTEGER", "primary_key": true},
                {"name": "name", "data_type": "VARCHAR(50)", "nullable": false},
                {"name": "a1", "data_type": "VARCHAR(10)", "server_default": "x"},
                {"name": "test2", "data_type": "VARCHAR(10)"}
            ],
            "foreign_keys": [
                {
                    "name": "fk_old",
                    "constrained_columns": ["test2"],
                    "referred_table": "table",
                    "referred_columns": ["test"]
                }
            ]
        }
    ]
}"#;

const AFTER: &str = r#"{
    "tables": [
        {
            "name": "table",
            "columns": [
                {"name": "id", "data_type": "INTEGER", "primary_key": true},
                {"name": "test", "data_type": "VARCHAR(10)"}
            ]
        },
        {
            "name": "user",
            "columns": [
                {"name": "id", "data_type": "INTEGER", "primary_key": true},
                {"name": "name", "data_type": "VARCHAR(50)", "nullable": false},
                {"name": "a1", "data_type": "VARCHAR(10)", "server_default": "x"},
                {"name": "test2", "data_type": "VARCHAR(10)"}
            ]
        }
    ]
}"#;

struct Fixture {
    _dir: TempDir,
    before: PathBuf,
    after: PathBuf,
}

fn fixture(before: &str, after: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let before_path = dir.path().join("before.json");
    let after_path = dir.path().join("after.json");
    std::fs::write(&before_path, before).unwrap();
    std::fs::write(&after_path, after).unwrap();
    Fixture {
        _dir: dir,
        before: before_path,
        after: after_path,
    }
}

fn fkdiff(args: &[&str], before: &Path, after: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fkdiff"))
        .args(args)
        .arg(before)
        .arg(after)
        .env_remove("FKDIFF_NAME_POLICY")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn diff_prints_dropped_fk() {
    let fx = fixture(BEFORE, AFTER);
    let out = fkdiff(&["diff"], &fx.before, &fx.after);

    assert!(out.status.success());
    assert_eq!(stdout(&out), "drop_fk user (test2) -> table (test) [fk_old]\n");
}

#[test]
fn diff_prints_added_fk_as_json() {
    let fx = fixture(AFTER, BEFORE);
    let out = fkdiff(&["diff", "--format", "json"], &fx.before, &fx.after);

    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let ops = value.as_array().unwrap();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["op"], "add_foreign_key");
    assert_eq!(ops[0]["table"], "user");
    assert_eq!(ops[0]["constraint"]["name"], "fk_old");
    assert_eq!(ops[0]["constraint"]["constrained_columns"][0], "test2");
}

#[test]
fn diff_table_filter_excludes_other_tables() {
    let fx = fixture(BEFORE, AFTER);
    let out = fkdiff(&["diff", "--table", "table"], &fx.before, &fx.after);

    assert!(out.status.success());
    assert_eq!(stdout(&out), "");
}

#[test]
fn rename_is_reported_only_under_compare_policy() {
    let renamed = BEFORE.replace("fk_old", "fk_new");
    let fx = fixture(BEFORE, &renamed);

    let out = fkdiff(&["diff"], &fx.before, &fx.after);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "");

    let out = fkdiff(&["--name-policy", "compare", "diff"], &fx.before, &fx.after);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "drop_fk user (test2) -> table (test) [fk_old]\n\
         add_fk user (test2) -> table (test) [fk_new]\n"
    );
}

#[test]
fn check_succeeds_without_changes() {
    let fx = fixture(BEFORE, BEFORE);
    let out = fkdiff(&["check"], &fx.before, &fx.after);
    assert!(out.status.success());
}

#[test]
fn check_fails_with_changes() {
    let fx = fixture(BEFORE, AFTER);
    let out = fkdiff(&["check"], &fx.before, &fx.after);

    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("1 foreign key change(s) pending"), "{stderr}");
    assert!(stderr.contains("drop_fk user"), "{stderr}");
}

#[test]
fn unreadable_snapshot_reports_path() {
    let fx = fixture(BEFORE, "{ not json");
    let out = fkdiff(&["diff"], &fx.before, &fx.after);

    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Failed to parse snapshot"), "{stderr}");
    assert!(stderr.contains("after.json"), "{stderr}");
}
