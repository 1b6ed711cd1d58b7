use std::path::Path;

use super::{extension, read_zip_properties, ArtifactCheck, ArtifactInvalidError, InvalidReason};
use crate::build::BuildTarget;

const VALID_EXTENSIONS: &[&str] = &[
    ".asc", ".jar", ".md5", ".module", ".pom", ".sha1", ".sha256", ".sha512", ".war", ".zip",
];
const JAR_MANIFEST: &str = "META-INF/MANIFEST.MF";
const IMPLEMENTATION_VERSION: &str = "Implementation-Version";

/// Maven repository file. Jars may declare an `Implementation-Version`, and
/// when they do it must be the component or the product version.
#[derive(Debug, Clone)]
pub struct MavenCheck {
    component_version: String,
    opensearch_version: String,
}

impl MavenCheck {
    pub fn new(target: &BuildTarget) -> Self {
        Self {
            component_version: target.component_version(),
            opensearch_version: target.opensearch_version(),
        }
    }
}

impl ArtifactCheck for MavenCheck {
    fn check(&self, path: &Path) -> Result<(), ArtifactInvalidError> {
        let ext = extension(path);
        if !VALID_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ArtifactInvalidError::new(
                path,
                InvalidReason::InvalidExtension { extension: ext },
            ));
        }
        if ext != ".jar" {
            return Ok(());
        }

        let manifest = read_zip_properties(path, JAR_MANIFEST)?;
        let accepted = [
            self.component_version.as_str(),
            self.opensearch_version.as_str(),
        ];
        manifest
            .check_value_in(IMPLEMENTATION_VERSION, &accepted, true)
            .into_result_any(IMPLEMENTATION_VERSION, &accepted)
            .map_err(|e| ArtifactInvalidError::new(path, InvalidReason::Config(e)))
    }
}
