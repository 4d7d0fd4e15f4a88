//! `package.json` detector (js family)

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{read_if_exists, Language, ManifestDetector, ManifestError, ProjectManifest};

const FILE_NAME: &str = "package.json";

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Decode manifest bytes. The top level must be an object or `null`; extra keys are ignored.
fn parse_package_json(bytes: &[u8]) -> Result<PackageJson, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if value.is_null() {
        return Ok(PackageJson::default());
    }
    if !value.is_object() {
        return Err(<serde_json::Error as serde::de::Error>::custom(
            "expected a JSON object at the top level",
        ));
    }
    serde_json::from_value(value)
}

pub struct PackageJsonDetector;

#[async_trait]
impl ManifestDetector for PackageJsonDetector {
    fn file_name(&self) -> &'static str {
        FILE_NAME
    }

    async fn detect(&self, directory: &Path) -> Result<Option<ProjectManifest>, ManifestError> {
        let Some((path, bytes)) = read_if_exists(directory, FILE_NAME).await? else {
            return Ok(None);
        };

        let package = parse_package_json(&bytes)
            .map_err(|source| ManifestError::PackageJson { path, source })?;

        Ok(Some(ProjectManifest {
            name: package.name,
            description: package.description,
            language: Language::Js,
        }))
    }
}
