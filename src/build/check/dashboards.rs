use std::path::Path;

use super::{extension, require_filename_version, ArtifactCheck, ArtifactInvalidError, InvalidReason};
use crate::build::BuildTarget;

/// Dashboards plugin zip, named after the product version (`alertingDashboards-1.1.0.zip`).
#[derive(Debug, Clone)]
pub struct DashboardsPluginCheck {
    version: String,
}

impl DashboardsPluginCheck {
    pub fn new(target: &BuildTarget) -> Self {
        Self {
            version: target.opensearch_version(),
        }
    }
}

impl ArtifactCheck for DashboardsPluginCheck {
    fn check(&self, path: &Path) -> Result<(), ArtifactInvalidError> {
        if extension(path) != ".zip" {
            return Err(ArtifactInvalidError::new(path, InvalidReason::NotAZip));
        }
        require_filename_version(path, &self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(snapshot: bool) -> DashboardsPluginCheck {
        let target = BuildTarget::builder("OpenSearch Dashboards", "1.1.0")
            .arch("x64")
            .snapshot(snapshot)
            .build_with_env(|_| None)
            .unwrap();
        DashboardsPluginCheck::new(&target)
    }

    #[test]
    fn accepts_product_versioned_zip() {
        check(false)
            .check(Path::new("alertingDashboards-1.1.0.zip"))
            .unwrap();
    }

    #[test]
    fn snapshot_requires_snapshot_suffix() {
        let err = check(true)
            .check(Path::new("alertingDashboards-1.1.0.zip"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Artifact alertingDashboards-1.1.0.zip is invalid. Expected filename to include 1.1.0-SNAPSHOT."
        );
    }
}
