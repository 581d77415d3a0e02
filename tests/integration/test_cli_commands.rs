use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use stepcut::core::document::{self, StepKind, WorkflowName};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("bitrise.yml")
}

fn stepcut(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stepcut").unwrap();
    cmd.current_dir(workdir).env_remove("RUST_LOG");
    for var in [
        "STEPCUT_REPO",
        "STEPCUT_REPO_BASE_URL",
        "STEPCUT_DOCUMENT",
        "STEPCUT_OUTPUT_DIR",
        "STEPCUT_OUTPUT_FILE",
        "STEPCUT_WORKFLOW",
        "STEPCUT_LOG_DIR",
        "STEPCUT_LOG_CONSOLE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_document_commands() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("DOCUMENT COMMANDS"))
        .stdout(predicate::str::contains("prune"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_prune_writes_modified_document_and_prints_path() {
    let workdir = TempDir::new().unwrap();
    let output = stepcut(workdir.path())
        .args(["prune", "--source"])
        .arg(fixture_path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let expected = workdir
        .path()
        .join("temp")
        .join("modified_bitrise.yml")
        .canonicalize()
        .unwrap();
    let printed = String::from_utf8(output.stdout).unwrap();
    assert_eq!(PathBuf::from(printed.trim()), expected);

    let written = fs::read(&expected).unwrap();
    let parsed = document::parse(&written).unwrap();
    assert!(parsed.mismatches.is_empty());
    let common = parsed.document.workflows.get(WorkflowName::Common);
    assert_eq!(common.steps.len(), 6);
    assert_eq!(common.steps[0].kind(), StepKind::ChangeWorkingDirectory);
}

#[test]
fn test_prune_reports_dropped_fields_on_stderr() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["prune", "--dry-run", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("dropping unrecognized field"))
        .stderr(predicate::str::contains("is_always_run"));
}

#[test]
fn test_prune_logs_applied_transform() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["prune", "--dry-run", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("applied transform"))
        .stderr(predicate::str::contains("ScriptPruneTransform"))
        .stderr(predicate::str::contains("removed=2"));
}

#[test]
fn test_explicit_config_also_configures_logging() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join("stepcut.toml"),
        "[logging]\nconsole_output = \"stderr\"\n",
    )
    .unwrap();
    let custom = workdir.path().join("custom.toml");
    fs::write(&custom, "[logging]\nconsole_output = \"none\"\n").unwrap();

    stepcut(workdir.path())
        .arg("--config")
        .arg(&custom)
        .args(["prune", "--dry-run", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stderr(predicate::str::contains("dropping unrecognized field").not());
}

#[test]
fn test_prune_dry_run_prints_yaml_without_writing() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["prune", "--dry-run", "--workflow", "audit-this-step", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("format_version: 4\n"))
        .stdout(predicate::str::contains("Audit this step").not())
        .stdout(predicate::str::contains("Clone sample app"));

    assert!(!workdir.path().join("temp").exists());
}

#[test]
fn test_prune_output_flags_override_config() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join("stepcut.toml"),
        "[output]\ndir = \"from-config\"\nfile_name = \"config.yml\"\n",
    )
    .unwrap();

    stepcut(workdir.path())
        .args(["prune", "--output-dir", "out", "--file-name", "pruned.yml", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pruned.yml"));

    assert!(workdir.path().join("out").join("pruned.yml").is_file());
    assert!(!workdir.path().join("from-config").exists());
}

#[test]
fn test_prune_uses_configured_output_location() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join("stepcut.toml"),
        "[output]\ndir = \"build/ci\"\nfile_name = \"bitrise.pruned.yml\"\n",
    )
    .unwrap();

    stepcut(workdir.path())
        .args(["prune", "--source"])
        .arg(fixture_path())
        .assert()
        .success();

    assert!(workdir
        .path()
        .join("build")
        .join("ci")
        .join("bitrise.pruned.yml")
        .is_file());
}

#[test]
fn test_prune_rejects_unknown_workflow() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["prune", "--workflow", "deploy", "--source"])
        .arg(fixture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown workflow 'deploy'"));
}

#[test]
fn test_prune_fails_on_invalid_yaml() {
    let workdir = TempDir::new().unwrap();
    let broken = workdir.path().join("broken.yml");
    fs::write(&broken, "workflows: [unclosed\n").unwrap();

    stepcut(workdir.path())
        .args(["prune", "--source"])
        .arg(&broken)
        .assert()
        .failure()
        .stderr(predicate::str::contains("DOC-PARSE-001"));

    assert!(!workdir.path().join("temp").exists());
}

#[test]
fn test_prune_fails_on_missing_source() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["prune", "--source", "does-not-exist.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.yml"));
}

#[test]
fn test_check_lists_unrecognized_fields() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["check", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[DOC-SCHEMA-001] unrecognized field 'project_type' at document root",
        ))
        .stdout(predicate::str::contains(
            "[DOC-SCHEMA-001] unrecognized field 'deploy' at workflows",
        ));
}

#[test]
fn test_check_json_format() {
    let workdir = TempDir::new().unwrap();
    let output = stepcut(workdir.path())
        .args(["check", "--format", "json", "--source"])
        .arg(fixture_path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 4);
    assert_eq!(findings[0]["field"], "project_type");
    assert_eq!(findings[2]["location"], "workflows._common.steps[1].script@1");
}

#[test]
fn test_show_lists_workflow_steps() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["show", "--workflow", "_common", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("_common (8 steps)"))
        .stdout(predicate::str::contains("* 2. script@1 - Clone sample app"))
        .stdout(predicate::str::contains("    5. path::./ - Step Test"))
        .stdout(predicate::str::contains("audit-this-step").not());
}

#[test]
fn test_show_lists_every_populated_workflow() {
    let workdir = TempDir::new().unwrap();
    stepcut(workdir.path())
        .args(["show", "--source"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("test (0 steps)"))
        .stdout(predicate::str::contains("audit-this-step (1 steps)"))
        .stdout(predicate::str::contains("test_bundle_id").not());
}
