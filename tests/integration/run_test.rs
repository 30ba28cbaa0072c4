use crate::common::{apiharvest, source_tree};
use predicates::prelude::*;

#[test]
fn run_packages_every_api() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "run")
        .assert()
        .success()
        .stdout(predicate::str::contains("API Harvest Report"))
        .stdout(predicate::str::contains("ok      alpha v1: 2 files"))
        .stdout(predicate::str::contains("skipped empty v1"))
        .stdout(predicate::str::contains("Completed: 2  Skipped: 1  Failed: 0"));

    let out = tmp.path().join("apis/google.com");
    let spec = out.join("alpha/v1/protos");
    assert!(spec.join("google/alpha/v1/alpha.proto").is_file());
    assert!(spec.join("google/alpha/v1/alpha_v1.yaml").is_file());
    assert!(spec.join("google/type/date.proto").is_file());
    assert!(!spec.join("google/protobuf").exists());
    assert!(out.join("beta/v2/protos/google/type/date.proto").is_file());
    assert!(!out.join("empty").exists());

    let api = std::fs::read_to_string(out.join("alpha/info.yaml")).unwrap();
    assert!(api.contains("kind: API"));
    assert!(api.contains("name: google.com-alpha"));
    assert!(api.contains("displayName: Google Alpha API"));

    let spec_record = std::fs::read_to_string(spec.join("info.yaml")).unwrap();
    assert!(spec_record.contains("parent: apis/google.com-alpha/versions/v1"));
    assert!(spec_record.contains("mimeType: application/x.protobuf+zip"));
    assert!(spec_record.contains("directory: google/alpha/v1"));

    let beta = std::fs::read_to_string(out.join("beta/info.yaml")).unwrap();
    assert!(beta.contains("displayName: Google Beta API"));
}

#[test]
fn copied_files_match_sources() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "run").assert().success();

    let source = std::fs::read(tmp.path().join("deps/googleapis/google/type/date.proto")).unwrap();
    let copied = std::fs::read(
        tmp.path()
            .join("apis/google.com/alpha/v1/protos/google/type/date.proto"),
    )
    .unwrap();
    assert_eq!(source, copied);
}

#[test]
fn api_selection_limits_the_run() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "run")
        .args(["--api", "google.beta.v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed: 1  Skipped: 0  Failed: 0"));

    let out = tmp.path().join("apis/google.com");
    assert!(out.join("beta/v2/protos/google/beta/v2/beta.proto").is_file());
    assert!(!out.join("alpha").exists());
}

#[test]
fn unknown_api_is_rejected() {
    let tmp = source_tree();
    apiharvest(tmp.path(), "run")
        .args(["--api", "google.nope.v1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("google.nope.v1"));
}

#[test]
fn out_flag_moves_output() {
    let tmp = source_tree();
    let out = tmp.path().join("elsewhere");
    apiharvest(tmp.path(), "run")
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success();
    assert!(out.join("alpha/v1/info.yaml").is_file());
    assert!(!tmp.path().join("apis").exists());
}

#[test]
fn json_report() {
    let tmp = source_tree();
    let output = apiharvest(tmp.path(), "run")
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["metadata"]["compiler"], "scan");
    assert_eq!(report["metadata"]["completed"], 2);
    assert_eq!(report["metadata"]["skipped"], 1);
    let apis = report["apis"].as_array().unwrap();
    assert_eq!(apis.len(), 3);
    assert_eq!(apis[0]["id"], "google.alpha.v1");
    assert_eq!(apis[0]["status"], "completed");
    assert_eq!(apis[1]["status"], "skipped");
}

#[test]
fn rerun_produces_identical_output() {
    let tmp = source_tree();
    let record = tmp
        .path()
        .join("apis/google.com/alpha/v1/protos/info.yaml");

    apiharvest(tmp.path(), "run").assert().success();
    let first = std::fs::read(&record).unwrap();
    apiharvest(tmp.path(), "run").assert().success();
    assert_eq!(first, std::fs::read(&record).unwrap());
}
