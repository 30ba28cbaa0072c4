use crate::common::write;
use assert_cmd::Command;
use predicates::prelude::*;

fn config_show(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("apiharvest").unwrap();
    cmd.env_remove("APIHARVEST_PROVIDER")
        .env_remove("APIHARVEST_COMPILER")
        .args(["config", "show", "--path", dir.to_str().unwrap()]);
    cmd
}

#[test]
fn config_show_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    config_show(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved settings:"))
        .stdout(predicate::str::contains("registry.provider: google.com <- default"))
        .stdout(predicate::str::contains("compiler.kind: protoc <- default"))
        .stdout(predicate::str::contains("compiler.timeout_secs: 300 <- default"))
        .stdout(predicate::str::contains("Run date: "));
}

#[test]
fn config_show_with_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        &tmp.path().join(".apiharvest.toml"),
        r#"
[registry]
provider = "example.com"

[compiler]
kind = "scan"
"#,
    );
    config_show(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(".apiharvest.toml"))
        .stdout(predicate::str::contains(
            "registry.provider: example.com <- project config",
        ))
        .stdout(predicate::str::contains("compiler.kind: scan <- project config"));
}

#[test]
fn env_var_overrides_project_config() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        &tmp.path().join(".apiharvest.toml"),
        "[registry]\nprovider = \"example.com\"\n",
    );
    config_show(tmp.path())
        .env("APIHARVEST_PROVIDER", "acme.dev")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "registry.provider: acme.dev <- env var (APIHARVEST_PROVIDER)",
        ));
}

#[test]
fn invalid_project_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    write(&tmp.path().join(".apiharvest.toml"), "[nonsense]\nx = 1\n");
    config_show(tmp.path()).assert().failure();
}
