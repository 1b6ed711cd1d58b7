//! Build manifest: provenance of what one build run produced.
//!
//! Components missing from the list were never recorded; a component with an
//! empty `artifacts` map was recorded but has produced nothing yet.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SCHEMA_VERSION;
use super::{Components, Manifest, ManifestError, ManifestKind, Named};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(rename = "schema-version")]
    pub schema_version: String,
    pub build: BuildInfo,
    /// `None` when the document has no `components` key, which is not the same as `[]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components<BuildComponent>>,
}

impl BuildManifest {
    /// An empty list leaves the `components` key out.
    pub fn new(build: BuildInfo, components: Components<BuildComponent>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            build,
            components: (!components.is_empty()).then_some(components),
        }
    }

    /// Lookup that fails when the name is not listed or there is no list.
    pub fn component(&self, name: &str) -> Result<&BuildComponent, ManifestError> {
        match &self.components {
            Some(components) => components.get(name),
            None => Err(ManifestError::ComponentNotFound(name.to_string())),
        }
    }

    pub fn iter_components(&self) -> impl Iterator<Item = &BuildComponent> {
        self.components.iter().flatten()
    }
}

impl Manifest for BuildManifest {
    const KIND: ManifestKind = ManifestKind::Build;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub architecture: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildComponent {
    pub name: String,
    pub repository: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub commit_id: String,
    /// Artifact type (`plugins`, `maven`, `dist`, ...) to paths relative to the output dir.
    pub artifacts: IndexMap<String, Vec<String>>,
    pub version: String,
}

impl BuildComponent {
    /// Paths recorded for `artifact_type`; empty when the type was never recorded.
    pub fn artifacts_of(&self, artifact_type: &str) -> &[String] {
        self.artifacts
            .get(artifact_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_artifact_type(&self, artifact_type: &str) -> bool {
        self.artifacts.contains_key(artifact_type)
    }
}

impl Named for BuildComponent {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILD_MANIFEST: &str = "\
schema-version: '1.0'
build:
  name: OpenSearch
  version: 1.1.0
  architecture: x64
  id: c3ff7a232d25403fa8cc14c97799c323
components:
  - name: OpenSearch
    repository: https://github.com/opensearch-project/OpenSearch.git
    ref: '1.1'
    commit_id: 15e9f137622d878b79103df8f82d78d782b686a1
    artifacts:
      maven:
        - maven/org/opensearch/opensearch/1.1.0/opensearch-1.1.0.jar
        - maven/org/opensearch/opensearch/1.1.0/opensearch-1.1.0.pom
      dist:
        - dist/opensearch-min-1.1.0-linux-x64.tar.gz
    version: 1.1.0.0
  - name: job-scheduler
    repository: https://github.com/opensearch-project/job-scheduler.git
    ref: '1.1'
    commit_id: 4504dabfc67dd5628c1451e91e9a1c3c4ca71525
    artifacts:
      plugins:
        - plugins/opensearch-job-scheduler-1.1.0.0.zip
    version: 1.1.0.0
";

    #[test]
    fn round_trips_and_keeps_artifact_type_order() {
        let original: serde_json::Value = serde_yaml::from_str(BUILD_MANIFEST).unwrap();
        let manifest = BuildManifest::from_yaml(BUILD_MANIFEST).unwrap();
        assert_eq!(manifest.to_value().unwrap(), original);

        let core = manifest.component("OpenSearch").unwrap();
        assert_eq!(
            core.artifacts.keys().collect::<Vec<_>>(),
            vec!["maven", "dist"]
        );
        assert_eq!(core.artifacts_of("dist").len(), 1);
        assert!(core.artifacts_of("plugins").is_empty());
    }

    #[test]
    fn components_key_is_optional_and_omitted_when_empty() {
        let manifest = BuildManifest::new(
            BuildInfo {
                name: "OpenSearch".into(),
                version: "1.1.0".into(),
                architecture: "x64".into(),
                id: "1".into(),
            },
            Components::default(),
        );
        assert_eq!(manifest.components, None);
        let yaml = manifest.to_yaml().unwrap();
        assert!(!yaml.contains("components"));
        assert_eq!(BuildManifest::from_yaml(&yaml).unwrap(), manifest);
        assert!(manifest.component("OpenSearch").is_err());
    }

    #[test]
    fn explicit_empty_components_list_round_trips() {
        let text = "\
schema-version: '1.0'
build:
  name: OpenSearch
  version: 1.1.0
  architecture: x64
  id: c3ff7a232d25403fa8cc14c97799c323
components: []
";
        let original: serde_json::Value = serde_yaml::from_str(text).unwrap();
        let manifest = BuildManifest::from_yaml(text).unwrap();
        assert_eq!(manifest.components, Some(Components::default()));
        assert_eq!(manifest.iter_components().count(), 0);
        assert_eq!(manifest.to_value().unwrap(), original);
        assert!(manifest.to_yaml().unwrap().contains("components: []"));
    }

    #[test]
    fn keys_are_written_in_schema_order() {
        let reordered = "\
build:
  id: '1'
  architecture: x64
  version: 1.1.0
  name: OpenSearch
schema-version: '1.0'
";
        let manifest = BuildManifest::from_yaml(reordered).unwrap();
        assert_eq!(manifest.build.id, "1");
        let yaml = manifest.to_yaml().unwrap();
        assert!(yaml.starts_with("schema-version: '1.0'\nbuild:\n  name: OpenSearch\n"));
        assert_eq!(BuildManifest::from_yaml(&yaml).unwrap(), manifest);
    }

    #[test]
    fn artifacts_must_be_lists_of_strings() {
        let yaml = BUILD_MANIFEST.replace(
            "        - plugins/opensearch-job-scheduler-1.1.0.0.zip",
            "        - 12",
        );
        let err = BuildManifest::from_yaml(&yaml).unwrap_err();
        assert!(err
            .to_string()
            .contains("/components/1/artifacts/plugins/0"));
    }
}
