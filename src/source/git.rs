use super::FetchError;
use std::path::Path;
use tokio::process::Command;

/// Shallow-clone `url` into a temporary directory and read `document` from it.
///
/// The clone is removed when this returns.
pub async fn clone_document(url: &str, document: &Path) -> Result<Vec<u8>, FetchError> {
    let workdir = tempfile::Builder::new()
        .prefix("stepcut-")
        .tempdir()
        .map_err(FetchError::Workspace)?;
    let checkout = workdir.path().join("repo");

    tracing::debug!(url, checkout = %checkout.display(), "cloning repository");
    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--quiet")
        .arg(url)
        .arg(&checkout)
        .output()
        .await
        .map_err(FetchError::GitUnavailable)?;

    if !output.status.success() {
        return Err(FetchError::Clone {
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let path = checkout.join(document);
    tokio::fs::read(&path)
        .await
        .map_err(|source| FetchError::Read { path, source })
}
