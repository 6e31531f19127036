use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn package_model(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_package-model"))
        .args(args)
        .output()
        .expect("failed to run package-model")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const VALID_YAML: &str = r#"
name: web
packages:
  - name: httpd
    version: 2.4.6-93.el7
    requires: openssl,apr
  - name: php
    version: latest
"#;

const INVALID_YAML: &str = r#"
name: broken
packages:
  - name: foo
    requires: some_other_pkg,foo,bar,foobar
  - name: legacy
    version: latest
    repository: extras
"#;

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_valid_documents() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "web.yml", VALID_YAML);

    let output = package_model(&["validate", dir.path().to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Validated 3 item(s): 0 error(s), 0 warning(s), 0 skipped."));
}

#[test]
fn validate_reports_cross_field_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.yaml", INVALID_YAML);

    let output = package_model(&["validate", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));

    let out = stdout(&output);
    assert!(out.contains(r#"broken/foo: requires: Package "foo" cannot require itself."#));
    assert!(out.contains(r#"broken/legacy: warning: Property "repository" is deprecated"#));
}

#[test]
fn validate_json_report_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write_file(dir.path(), "broken.yaml", INVALID_YAML);
    let config = write_file(
        dir.path(),
        "policy.yml",
        "version: \"1.0\"\nexclude: [foo]\ndeprecated: allow\n",
    );

    let output = package_model(&[
        "validate",
        doc.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["skipped"], serde_json::json!(["broken/foo"]));
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);
}

#[test]
fn validate_missing_input_fails() {
    let output = package_model(&["validate", "/nonexistent/package-model/web.yml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: Failed to load"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_duplicate_requirements() {
    let output = package_model(&[
        "check",
        "--prop",
        "name=foo",
        "--prop",
        "requires=bar,foobar,bar,httpd,httpd",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(
        stdout(&output),
        "requires: Package \"foo\" has duplicated requirements. Duplicate package requires are : \"bar\" \"httpd\" \n"
    );
}

#[test]
fn check_accepts_valid_package() {
    let output = package_model(&[
        "check",
        "--prop",
        "name=foo",
        "--prop",
        "version=1.2",
        "--prop",
        "release=3",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "package is valid.\n");
}

#[test]
fn check_unknown_item_type_fails() {
    let output = package_model(&["check", "--item-type", "service", "--prop", "name=foo"]);
    assert_eq!(output.status.code(), Some(1));
}

// ---------------------------------------------------------------------------
// types
// ---------------------------------------------------------------------------

#[test]
fn types_exports_registered_types() {
    let output = package_model(&["types"]);
    assert!(output.status.success());

    let export: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = export["property_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert!(ids.ends_with(&["package_version", "package_config", "package_requires"]));

    let items: Vec<&str> = export["item_types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["package-list", "package"]);
}
