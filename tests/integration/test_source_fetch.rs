use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use stepcut::core::document;
use stepcut::core::error::AppError;
use stepcut::core::types::ErrorCategory;
use stepcut::source::{fetch, FetchError, SourceSpec};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("../fixtures/bitrise.yml");

#[tokio::test]
async fn test_fetch_reads_local_file() {
    let temp_dir = TempDir::new().unwrap();
    let document_path = temp_dir.path().join("bitrise.yml");
    fs::write(&document_path, FIXTURE).unwrap();

    let spec = SourceSpec::from_location(document_path.to_str().unwrap());
    let bytes = fetch(&spec).await.unwrap();

    assert_eq!(bytes, FIXTURE.as_bytes());
}

#[tokio::test]
async fn test_fetch_missing_file_reports_path() {
    let spec = SourceSpec::File(PathBuf::from("/nonexistent/stepcut/bitrise.yml"));
    let err = fetch(&spec).await.unwrap_err();

    assert!(matches!(err, FetchError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/stepcut/bitrise.yml"));
    let app: AppError = err.into();
    assert_eq!(app.category, ErrorCategory::FetchError);
}

#[tokio::test]
async fn test_fetch_downloads_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/steps-ios-auto-provision/bitrise.yml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .mount(&mock_server)
        .await;

    let location = format!("{}/steps-ios-auto-provision/bitrise.yml", mock_server.uri());
    let spec = SourceSpec::from_location(&location);
    assert!(matches!(spec, SourceSpec::Url(_)));

    let bytes = fetch(&spec).await.unwrap();
    let parsed = document::parse(&bytes).unwrap();
    assert_eq!(parsed.document.format_version, 4);
}

#[tokio::test]
async fn test_fetch_url_error_status_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.yml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let spec = SourceSpec::from_location(&format!("{}/missing.yml", mock_server.uri()));
    let err = fetch(&spec).await.unwrap_err();

    assert!(matches!(err, FetchError::Http { .. }));
    assert!(err.to_string().contains("404"));
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=stepcut",
            "-c",
            "user.email=stepcut@example.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

#[tokio::test]
async fn test_fetch_clones_repository_document() {
    if !git_available() {
        eprintln!("git not available; skipping clone test");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("steps-ios-auto-provision");
    fs::create_dir_all(repo.join("ci")).unwrap();
    fs::write(repo.join("ci").join("bitrise.yml"), FIXTURE).unwrap();
    git(&repo, &["init", "--quiet"]);
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "--quiet", "-m", "add workflow document"]);

    let spec = SourceSpec::Git {
        url: format!("file://{}", repo.display()),
        document: PathBuf::from("ci/bitrise.yml"),
    };
    let bytes = fetch(&spec).await.unwrap();
    assert_eq!(bytes, FIXTURE.as_bytes());

    let spec = SourceSpec::Git {
        url: format!("file://{}", repo.display()),
        document: PathBuf::from("missing.yml"),
    };
    let err = fetch(&spec).await.unwrap_err();
    assert!(matches!(err, FetchError::Read { .. }));
}

#[tokio::test]
async fn test_fetch_clone_failure_carries_stderr() {
    if !git_available() {
        eprintln!("git not available; skipping clone test");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let spec = SourceSpec::Git {
        url: format!("file://{}", temp_dir.path().join("no-such-repo").display()),
        document: PathBuf::from("bitrise.yml"),
    };
    let err = fetch(&spec).await.unwrap_err();

    match &err {
        FetchError::Clone { stderr, .. } => assert!(!stderr.is_empty()),
        other => panic!("expected clone failure, got {:?}", other),
    }
    let app: AppError = err.into();
    assert_eq!(app.category, ErrorCategory::FetchError);
}
