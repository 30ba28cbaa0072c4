use crate::common::{apiharvest, source_tree};
use predicates::prelude::*;

#[test]
fn list_shows_catalog_entries() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "list")
        .assert()
        .success()
        .stdout(predicate::str::contains("google.alpha.v1"))
        .stdout(predicate::str::contains("google/beta/v2"))
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn list_json() {
    let tmp = source_tree();
    let output = apiharvest(tmp.path(), "list")
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["api_id"], "alpha");
    assert_eq!(rows[2]["version"], "v2");
}
