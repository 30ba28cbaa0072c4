use assert_cmd::Command;
use std::path::Path;

pub const CATALOG: &str = r#"{
  "apis": [
    {
      "id": "google.alpha.v1",
      "directory": "google/alpha/v1",
      "version": "v1",
      "majorVersion": "v1",
      "hostName": "alpha.googleapis.com",
      "title": "Alpha API",
      "configFile": "alpha_v1.yaml",
      "nameInServiceConfig": "alpha.googleapis.com"
    },
    {
      "id": "google.empty.v1",
      "directory": "google/empty/v1",
      "version": "v1",
      "title": "Empty API",
      "configFile": "empty_v1.yaml",
      "nameInServiceConfig": "empty.googleapis.com"
    },
    {
      "id": "google.beta.v2",
      "directory": "google/beta/v2",
      "version": "v2",
      "title": "Google Beta API",
      "configFile": "beta_v2.yaml",
      "nameInServiceConfig": "beta.googleapis.com"
    }
  ]
}
"#;

pub fn write(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

/// A workspace holding `deps/googleapis` with a catalog of three APIs: two
/// with definition files sharing an import, one with an empty directory.
pub fn source_tree() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    let tree = tmp.path().join("deps/googleapis");
    write(&tree.join("api-index-v1.json"), CATALOG);
    write(
        &tree.join("google/alpha/v1/alpha.proto"),
        r#"syntax = "proto3";
package google.alpha.v1;
import "google/type/date.proto";
import "google/protobuf/timestamp.proto";
message Alpha { google.type.Date day = 1; }
"#,
    );
    write(&tree.join("google/alpha/v1/alpha_v1.yaml"), "type: google.api.Service\nname: alpha.googleapis.com\n");
    write(
        &tree.join("google/beta/v2/beta.proto"),
        "syntax = \"proto3\";\nimport \"google/type/date.proto\";\n",
    );
    write(&tree.join("google/beta/v2/beta_v2.yaml"), "type: google.api.Service\nname: beta.googleapis.com\n");
    write(
        &tree.join("google/type/date.proto"),
        "syntax = \"proto3\";\npackage google.type;\nmessage Date { int32 year = 1; }\n",
    );
    std::fs::create_dir_all(tree.join("google/empty/v1")).unwrap();
    tmp
}

/// Add an API whose only file imports something that does not exist.
pub fn add_broken_api(root: &Path) {
    let tree = root.join("deps/googleapis");
    let catalog = CATALOG.replacen(
        "\"apis\": [",
        r#""apis": [
    {
      "id": "google.broken.v1",
      "directory": "google/broken/v1",
      "version": "v1",
      "title": "Broken API",
      "configFile": "broken_v1.yaml",
      "nameInServiceConfig": "broken.googleapis.com"
    },"#,
        1,
    );
    write(&tree.join("api-index-v1.json"), &catalog);
    write(
        &tree.join("google/broken/v1/broken.proto"),
        "import \"google/nowhere/missing.proto\";\n",
    );
}

/// The binary pointed at `root`, offline, using the in-process resolver.
pub fn apiharvest(root: &Path, command: &str) -> Command {
    let mut cmd = Command::cargo_bin("apiharvest").unwrap();
    cmd.env_remove("RUST_LOG")
        .args([
            command,
            "--path",
            root.to_str().unwrap(),
            "--no-fetch",
            "--compiler",
            "scan",
            "--quiet",
        ]);
    cmd
}
