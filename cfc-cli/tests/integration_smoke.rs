//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("seed"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("0.0.0.0:8000"))
        .stdout(predicate::str::contains("CFC_BIND"))
        .stdout(predicate::str::contains("CFC_MEMORY"));
}

#[test]
fn test_seed_help() {
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.arg("seed").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--collection"))
        .stdout(predicate::str::contains("--database"));
}

#[test]
fn test_seed_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.current_dir(dir.path())
        .arg("seed")
        .arg("does-not-exist.json");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_seed_without_mongodb_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("resources.json");
    std::fs::write(&file, r#"[{"title":"A"}]"#).unwrap();

    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MONGODB")
        .arg("seed")
        .arg(&file);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("MONGODB"));
}

#[test]
fn test_serve_without_jwt_secret_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("JWT_SECRET_KEY")
        .arg("serve")
        .arg("--memory")
        .arg("--bind")
        .arg("127.0.0.1:0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET_KEY"));
}

#[test]
fn test_serve_memory_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MONGODB")
        .env_remove("JWT_SECRET_KEY")
        .env("CFC_MEMORY", "true")
        .env("CFC_BIND", "127.0.0.1:0")
        .arg("serve");

    // Gets past the store choice without MONGODB and stops at the auth config
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET_KEY"))
        .stderr(predicate::str::contains("MONGODB not set").not());
}

#[test]
fn test_serve_rejects_bad_bind_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("cfc").unwrap();
    cmd.current_dir(dir.path())
        .env("CFC_BIND", "not-an-address")
        .arg("serve")
        .arg("--memory");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--bind"));
}
