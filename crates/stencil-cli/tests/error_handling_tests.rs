//! Exit codes and error output.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn stencil(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("stencil");
    cmd.current_dir(root)
        .env_clear()
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env("STENCIL_TEMPLATES_DIR", root.join("templates"))
        .env("STENCIL_SCHEMAS_DIR", root.join("schemas"))
        .env("NO_COLOR", "1");
    cmd
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn unknown_target_is_not_found() {
    let dir = TempDir::new().unwrap();
    stencil(dir.path())
        .args(["generate", "to", "epic", "--var", "x=1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Template not found"))
        .stderr(predicate::str::contains("stencil list templates"));
}

#[test]
fn custom_path_cannot_leave_the_template_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "templates/to/task/f_task.md", "Do {title}\n");
    write(dir.path(), "x/keep", "");
    write(dir.path(), "secret.md", "TOP SECRET\n");

    stencil(dir.path())
        .args(["generate", "to", "epic", "--path", "../x/../secret.md"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("TOP SECRET").not())
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn missing_variable_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "templates/to/task/f_task.md", "Title: {title}\n");

    stencil(dir.path())
        .args(["generate", "to", "task"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("title"));
}

#[test]
fn ignore_policy_leaves_placeholders() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "templates/to/task/f_task.md", "Title: {title}\n");

    stencil(dir.path())
        .args(["generate", "to", "task", "--policy", "ignore"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: {title}"));
}

#[test]
fn malformed_var_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    stencil(dir.path())
        .args(["generate", "to", "task", "--var", "no-equals-sign"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn invalid_variable_name_is_a_user_error() {
    let dir = TempDir::new().unwrap();
    stencil(dir.path())
        .args(["generate", "to", "task", "--var", "9lives=x"])
        .assert()
        .code(2);
}

#[test]
fn strict_mode_requires_schema() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "templates/to/task/f_task.md", "Do {title}\n");

    stencil(dir.path())
        .args(["resolve", "to", "task", "--strict", "--no-fallback"])
        .assert()
        .failure();
}

#[test]
fn schema_check_reports_missing_reference() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "schemas/to/task/f_task.json",
        r#"{"$ref": "to/task/missing.json"}"#,
    );

    stencil(dir.path())
        .args(["schemas", "check"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("to/task/missing.json"))
        .stderr(predicate::str::contains("Schema check failed"));
}

#[test]
fn explicit_missing_config_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    stencil(dir.path())
        .args(["--config", "nope.toml", "list", "templates"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn json_errors_are_structured() {
    let dir = TempDir::new().unwrap();
    let out = stencil(dir.path())
        .args(["--format", "json", "resolve", "to", "epic"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(out.stdout.is_empty());

    let stderr = String::from_utf8(out.stderr).unwrap();
    let start = stderr.find("{\n").unwrap();
    let doc: serde_json::Value = serde_json::from_str(&stderr[start..]).unwrap();
    assert_eq!(doc["error"]["code"], "TEMPLATE_NOT_FOUND");
    assert_eq!(doc["error"]["exitCode"], 3);
}

#[test]
fn empty_stdin_is_rejected() {
    let dir = TempDir::new().unwrap();
    stencil(dir.path())
        .args(["generate", "to", "task", "--stdin"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("stdin is empty"));
}
