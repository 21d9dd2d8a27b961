use std::process::{Command, Output};

fn cinebook(args: &[&str], migration_dir: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cinebook"))
        .args(args)
        .env("MIGRATION_DIR", migration_dir)
        .env("ENVIRONMENT", "DEV")
        .env_remove("DATABASE_URL")
        .env_remove("HEALTHCHECK_URL")
        .output()
        .unwrap()
}

#[test]
fn unknown_flag_prints_usage_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = cinebook(&["-z"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"), "{stderr}");
}

#[test]
fn revision_with_unknown_flag_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = cinebook(&["revision", "-z"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn help_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let output = cinebook(&["--help"], dir.path());

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "revision", "upgrade", "downgrade", "status", "healthcheck"] {
        assert!(stdout.contains(command), "{command} missing from help");
    }
}

#[test]
fn healthcheck_fails_when_nothing_listens() {
    let dir = tempfile::tempdir().unwrap();
    let output = cinebook(&["healthcheck", "--url", "http://127.0.0.1:9/"], dir.path());

    assert_eq!(output.status.code(), Some(1));
}
