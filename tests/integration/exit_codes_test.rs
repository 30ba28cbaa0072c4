use crate::common::{add_broken_api, apiharvest, source_tree};
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn exit_code_0_when_every_api_succeeds() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "run").assert().code(0);
}

#[test]
fn exit_code_1_after_attempting_every_api() {
    let tmp = source_tree();
    add_broken_api(tmp.path());
    apiharvest(tmp.path(), "run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED  broken v1"))
        .stdout(predicate::str::contains("Completed: 2  Skipped: 1  Failed: 1"));

    // APIs after the failing one were still produced.
    let out = tmp.path().join("apis/google.com");
    assert!(out.join("alpha/v1/protos/google/alpha/v1/alpha.proto").is_file());
    assert!(out.join("beta/v2/info.yaml").is_file());
    assert!(!out.join("broken/v1").exists());
}

#[test]
fn missing_catalog_aborts_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("deps/googleapis")).unwrap();
    apiharvest(tmp.path(), "run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api-index-v1.json"));
}

#[test]
fn bad_path_fails() {
    Command::cargo_bin("apiharvest")
        .unwrap()
        .args(["run", "--path", "/nonexistent/path", "--no-fetch"])
        .assert()
        .failure();
}
