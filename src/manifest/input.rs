//! Input manifest: the declared, pre-resolved component list for one release.
//!
//! ```yaml
//! schema-version: '1.0'
//! build:
//!   name: OpenSearch
//!   version: 1.1.0
//! components:
//!   - name: common-utils
//!     repository: https://github.com/opensearch-project/common-utils.git
//!     ref: '1.1'
//!     checks:
//!       - name: gradle:publish
//!       - name: gradle:dependencies:opensearch.version
//!         args: alerting
//! ```

use serde::{Deserialize, Serialize};

use super::schema::SCHEMA_VERSION;
use super::{Components, Manifest, ManifestKind, Named};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputManifest {
    #[serde(rename = "schema-version")]
    pub schema_version: String,
    pub build: InputBuild,
    pub components: Components<InputComponent>,
}

impl InputManifest {
    pub fn new(build: InputBuild, components: Components<InputComponent>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            build,
            components,
        }
    }
}

impl Manifest for InputManifest {
    const KIND: ManifestKind = ManifestKind::Input;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBuild {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputComponent {
    pub name: String,
    pub repository: String,
    /// Branch, tag or commit; never parsed as a version.
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<Check>>,
}

impl InputComponent {
    pub fn checks(&self) -> &[Check] {
        self.checks.as_deref().unwrap_or_default()
    }
}

impl Named for InputComponent {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A post-build check, e.g. `gradle:properties:version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::manifest::ManifestError;

    fn manifests_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("manifests")
    }

    #[test]
    fn parses_1_0_manifest() {
        let manifest =
            InputManifest::from_path(&manifests_dir().join("1.0.0/opensearch-1.0.0.yml")).unwrap();
        assert_eq!(manifest.schema_version, "1.0");
        assert_eq!(manifest.build.name, "OpenSearch");
        assert_eq!(manifest.build.version, "1.0.0");
        let core = manifest.components.iter().next().unwrap();
        assert_eq!(core.name, "OpenSearch");
        assert_eq!(
            core.repository,
            "https://github.com/opensearch-project/OpenSearch.git"
        );
        assert_eq!(core.git_ref, "1.0");
    }

    #[test]
    fn parses_checks_with_and_without_args() {
        let manifest =
            InputManifest::from_path(&manifests_dir().join("1.1.0/opensearch-1.1.0.yml")).unwrap();
        assert_eq!(manifest.build.version, "1.1.0");
        let alerting = manifest.components.get("alerting").unwrap();
        let checks = alerting.checks();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].args, None);
        assert_eq!(checks[1].args.as_deref(), Some("alerting"));
    }

    #[test]
    fn serializing_returns_the_parsed_document() {
        let path = manifests_dir().join("1.1.0/opensearch-1.1.0.yml");
        let text = std::fs::read_to_string(&path).unwrap();
        let original: serde_json::Value = serde_yaml::from_str(&text).unwrap();
        let manifest = InputManifest::from_yaml(&text).unwrap();
        assert_eq!(manifest.to_value().unwrap(), original);

        let reparsed = InputManifest::from_yaml(&manifest.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn numeric_ref_is_a_schema_error_naming_the_field() {
        let yaml = "\
schema-version: '1.0'
build:
  name: OpenSearch
  version: 1.1.0
components:
  - name: OpenSearch
    repository: https://github.com/opensearch-project/OpenSearch.git
    ref: 1.1
";
        let err = InputManifest::from_yaml(yaml).unwrap_err();
        let ManifestError::Schema(ref violations) = err else {
            panic!("expected a schema error, got {err}");
        };
        assert_eq!(violations[0].path, "/components/0/ref");
        assert!(err.to_string().starts_with("Invalid manifest schema: /components/0/ref:"));
    }

    #[test]
    fn duplicate_components_are_rejected() {
        let yaml = "\
schema-version: '1.0'
build:
  name: OpenSearch
  version: 1.1.0
components:
  - name: job-scheduler
    repository: https://github.com/opensearch-project/job-scheduler.git
    ref: main
  - name: job-scheduler
    repository: https://github.com/opensearch-project/job-scheduler.git
    ref: '1.1'
";
        let err = InputManifest::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate component name 'job-scheduler'"));
    }
}
