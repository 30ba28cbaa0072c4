use crate::common::{add_broken_api, apiharvest, source_tree};
use predicates::prelude::*;

#[test]
fn resolve_prints_sorted_closure() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "resolve")
        .arg("google.alpha.v1")
        .assert()
        .success()
        .stdout("google/alpha/v1/alpha.proto\ngoogle/type/date.proto\n");

    // Nothing is written.
    assert!(!tmp.path().join("apis").exists());
}

#[test]
fn resolve_json() {
    let tmp = source_tree();
    let output = apiharvest(tmp.path(), "resolve")
        .args(["google.beta.v2", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["id"], "google.beta.v2");
    assert_eq!(
        value["files"],
        serde_json::json!(["google/beta/v2/beta.proto", "google/type/date.proto"])
    );
}

#[test]
fn resolve_empty_api_prints_nothing() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "resolve")
        .arg("google.empty.v1")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn resolve_reports_missing_import() {
    let tmp = source_tree();
    add_broken_api(tmp.path());
    apiharvest(tmp.path(), "resolve")
        .arg("google.broken.v1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("google/nowhere/missing.proto"));
}
