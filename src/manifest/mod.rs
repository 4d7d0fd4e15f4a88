//! Project manifest detection.
//!
//! A directory is recognized by probing well-known manifest files in a fixed
//! order. The first detector that finds its file decides the outcome; a file
//! that exists but cannot be parsed is an error rather than a miss.

mod go_mod;
mod package_json;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use go_mod::{GoModDetector, GoModSyntaxError};
pub use package_json::PackageJsonDetector;

/// Language family inferred from the manifest kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Js,
    Go,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Js => "js",
            Language::Go => "go",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifying metadata extracted from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub language: Language,
}

/// Outcome of probing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Recognized(ProjectManifest),
    NotRecognized,
}

/// A manifest file exists but could not be used
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("read {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("decode {} content failed: {source}", .path.display())]
    PackageJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("parse {} failed: {source}", .path.display())]
    GoMod {
        path: PathBuf,
        source: GoModSyntaxError,
    },
}

/// One recognizable manifest kind.
///
/// `detect` returns `Ok(None)` when the manifest file is absent, which is the
/// normal outcome for directories of another kind.
#[async_trait]
pub trait ManifestDetector: Send + Sync {
    /// File name probed inside the directory
    fn file_name(&self) -> &'static str;

    async fn detect(&self, directory: &Path) -> Result<Option<ProjectManifest>, ManifestError>;
}

/// Read `directory/file_name` if it exists.
///
/// Missing files are `Ok(None)`; once the file is known to exist, any read
/// failure is reported.
pub(crate) async fn read_if_exists(
    directory: &Path,
    file_name: &str,
) -> Result<Option<(PathBuf, Vec<u8>)>, ManifestError> {
    let path = directory.join(file_name);
    if tokio::fs::metadata(&path).await.is_err() {
        return Ok(None);
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(Some((path, bytes))),
        Err(source) => Err(ManifestError::Read { path, source }),
    }
}

/// Ordered chain of detectors, first match wins
pub struct ManifestReader {
    detectors: Vec<Box<dyn ManifestDetector>>,
}

impl ManifestReader {
    /// `package.json` first, then `go.mod`
    pub fn new() -> Self {
        Self::with_detectors(vec![
            Box::new(PackageJsonDetector),
            Box::new(GoModDetector),
        ])
    }

    pub fn with_detectors(detectors: Vec<Box<dyn ManifestDetector>>) -> Self {
        Self { detectors }
    }

    pub async fn detect(&self, directory: &Path) -> Result<Detection, ManifestError> {
        for detector in &self.detectors {
            if let Some(manifest) = detector.detect(directory).await? {
                tracing::debug!(
                    "Recognized {} as {} project via {}",
                    directory.display(),
                    manifest.language,
                    detector.file_name()
                );
                return Ok(Detection::Recognized(manifest));
            }
        }

        tracing::debug!("No manifest found in {}", directory.display());
        Ok(Detection::NotRecognized)
    }
}

impl Default for ManifestReader {
    fn default() -> Self {
        Self::new()
    }
}
