use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use stepcut::core::config::{ConfigLoader, ConfigValidator, CONFIG_FILE_NAME};
use stepcut::core::document::WorkflowName;
use stepcut::core::types::ErrorCategory;
use tempfile::TempDir;

fn clear_stepcut_env() {
    for v in &[
        "STEPCUT_REPO",
        "STEPCUT_REPO_BASE_URL",
        "STEPCUT_DOCUMENT",
        "STEPCUT_OUTPUT_DIR",
        "STEPCUT_OUTPUT_FILE",
        "STEPCUT_WORKFLOW",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_stepcut_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[source]
repo = "steps-xcode-archive"
repo_base_url = "https://git.example.com/steplib/"
document = "ci/bitrise.yml"

[output]
dir = "out"
file_name = "pruned.yml"

[prune]
workflow = "test_tvos"

[logging]
default_level = "debug"
"#;

    fs::write(workspace_path.join(CONFIG_FILE_NAME), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();

    assert_eq!(config.source.repo, "steps-xcode-archive");
    assert_eq!(
        config.source.repo_url(&config.source.repo),
        "https://git.example.com/steplib/steps-xcode-archive.git"
    );
    assert_eq!(config.source.document, PathBuf::from("ci/bitrise.yml"));
    assert_eq!(config.output.dir, PathBuf::from("out"));
    assert_eq!(config.output.file_name, "pruned.yml");
    assert_eq!(
        ConfigValidator::target_workflow(&config).unwrap(),
        WorkflowName::TestTvos
    );
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_stepcut_env();
    let temp_dir = TempDir::new().unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();

    assert_eq!(config.source.repo, "steps-ios-auto-provision");
    assert_eq!(config.output.dir, PathBuf::from("temp"));
    assert_eq!(config.output.file_name, "modified_bitrise.yml");
    assert_eq!(config.prune.workflow, "_common");
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_stepcut_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[output]\ndir = \"from-file\"\n\n[prune]\nworkflow = \"test\"\n",
    )
    .unwrap();

    env::set_var("STEPCUT_OUTPUT_DIR", "from-env");
    env::set_var("STEPCUT_WORKFLOW", "share-this-step");
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    clear_stepcut_env();

    assert_eq!(config.output.dir, PathBuf::from("from-env"));
    assert_eq!(config.prune.workflow, "share-this-step");
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_stepcut_env();
    let temp_dir = TempDir::new().unwrap();

    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[prune]\nworkflow = \"deploy\"\n",
    )
    .unwrap();
    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert!(err.message.contains("unknown workflow 'deploy'"));

    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[output]\nfile_name = \"nested/out.yml\"\n",
    )
    .unwrap();
    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);

    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[source\nrepo = 1\n").unwrap();
    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
}

#[test]
#[serial]
fn test_explicit_path_must_exist() {
    clear_stepcut_env();
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("custom.toml");

    let err = ConfigLoader::load_explicit(&missing).unwrap_err();
    assert_eq!(err.category, ErrorCategory::IoError);

    fs::write(&missing, "[output]\nfile_name = \"custom.yml\"\n").unwrap();
    let config = ConfigLoader::load_explicit(&missing).unwrap();
    assert_eq!(config.output.file_name, "custom.yml");
}
