use std::path::Path;

use super::{
    extension, read_zip_properties, require_filename_version, ArtifactCheck,
    ArtifactInvalidError, InvalidReason,
};
use crate::build::BuildTarget;

const DESCRIPTOR: &str = "plugin-descriptor.properties";

/// OpenSearch plugin zip: the file name and the embedded descriptor must both
/// carry the component version.
#[derive(Debug, Clone)]
pub struct PluginCheck {
    component_version: String,
}

impl PluginCheck {
    pub fn new(target: &BuildTarget) -> Self {
        Self {
            component_version: target.component_version(),
        }
    }
}

impl ArtifactCheck for PluginCheck {
    fn check(&self, path: &Path) -> Result<(), ArtifactInvalidError> {
        if extension(path) != ".zip" {
            return Err(ArtifactInvalidError::new(path, InvalidReason::NotAZip));
        }
        require_filename_version(path, &self.component_version)?;

        let descriptor = read_zip_properties(path, DESCRIPTOR)?;
        descriptor
            .check_value("version", &self.component_version)
            .into_result("version", &self.component_version)
            .map_err(|e| ArtifactInvalidError::new(path, InvalidReason::Config(e)))?;
        Ok(())
    }
}
