use std::{fs, path::Path};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const PETSTORE: &str = include_str!("../../oapi-pygen/tests/fixtures/petstore.yaml");

fn oapi_pygen(cwd: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("oapi-pygen");
    cmd.current_dir(cwd).env_remove("OAPI_PYGEN_CONFIG");
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    oapi_pygen(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--base_url"))
        .stdout(predicate::str::contains("--base_api_cls"))
        .stdout(predicate::str::contains("--template-dir"));
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    oapi_pygen(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("oapi-pygen"));
}

#[test]
fn test_input_is_required() {
    let dir = tempfile::tempdir().unwrap();
    oapi_pygen(dir.path())
        .args(["-o", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

// ============================================================================
// Shell Completions Tests
// ============================================================================

#[test]
fn test_show_completion_bash() {
    let dir = tempfile::tempdir().unwrap();
    oapi_pygen(dir.path())
        .args(["--show-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oapi-pygen"))
        .stdout(predicate::str::contains("--base_url"));
}

// ============================================================================
// Generation Tests
// ============================================================================

#[test]
fn test_generates_the_package() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("petstore.yaml"), PETSTORE).unwrap();

    oapi_pygen(dir.path())
        .args([
            "-i",
            "petstore.yaml",
            "-o",
            "client",
            "-p",
            "PetStore",
            "--base_url",
            "https://petstore.swagger.io/v1",
            "--formatter",
            "none",
        ])
        .assert()
        .success();

    let out = dir.path().join("client");
    for name in ["__init__.py", "client.py", "endpoints.py", "models.py"] {
        assert!(out.join(name).is_file(), "{} missing", name);
    }
    let client = fs::read_to_string(out.join("client.py")).unwrap();
    assert!(client.contains("class PetStoreAPIClient(APIClient):"));
    let endpoints = fs::read_to_string(out.join("endpoints.py")).unwrap();
    assert!(endpoints.contains("@endpoint(base_url='https://petstore.swagger.io/v1')"));
}

#[test]
fn test_reads_the_document_from_stdin() {
    let dir = tempfile::tempdir().unwrap();

    oapi_pygen(dir.path())
        .args(["-i", "-", "-o", "client", "--formatter", "none"])
        .write_stdin(PETSTORE)
        .assert()
        .success();

    let models = fs::read_to_string(dir.path().join("client/models.py")).unwrap();
    assert!(models.contains("#   filename:  <stdin>"));
}

#[test]
fn test_reads_pyproject_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("petstore.yaml"), PETSTORE).unwrap();
    fs::write(
        dir.path().join("pyproject.toml"),
        "[tool.datamodel-codegen]\nbase-class = \"shared.models.Base\"\n",
    )
    .unwrap();

    oapi_pygen(dir.path())
        .args(["-i", "petstore.yaml", "-o", "client", "--formatter", "none"])
        .assert()
        .success();

    let models = fs::read_to_string(dir.path().join("client/models.py")).unwrap();
    assert!(models.contains("from shared.models import Base"));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    oapi_pygen(dir.path())
        .args(["-i", "missing.yaml", "-o", "client", "--formatter", "none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
    assert!(!dir.path().join("client").exists());
}

#[test]
fn test_swagger_documents_fail() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("old.yaml"), "swagger: '2.0'\npaths: {}\n").unwrap();

    oapi_pygen(dir.path())
        .args(["-i", "old.yaml", "-o", "client", "--formatter", "none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("old.yaml"));
}
