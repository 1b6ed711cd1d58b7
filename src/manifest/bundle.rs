//! Bundle manifest: what the assembled archive contains and where each part lives.
//!
//! Written next to the tarball and inside it, then read back as the input of
//! downstream test and sign stages.

use serde::{Deserialize, Serialize};

use super::schema::SCHEMA_VERSION;
use super::{Components, Manifest, ManifestError, ManifestKind, Named};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(rename = "schema-version")]
    pub schema_version: String,
    pub build: BundleBuild,
    /// `None` when the document has no `components` key, which is not the same as `[]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components<BundleComponent>>,
}

impl BundleManifest {
    pub fn new(build: BundleBuild) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            build,
            components: None,
        }
    }

    /// Lookup that fails when the name is not listed or there is no list.
    pub fn component(&self, name: &str) -> Result<&BundleComponent, ManifestError> {
        match &self.components {
            Some(components) => components.get(name),
            None => Err(ManifestError::ComponentNotFound(name.to_string())),
        }
    }

    pub fn iter_components(&self) -> impl Iterator<Item = &BundleComponent> {
        self.components.iter().flatten()
    }
}

impl Manifest for BundleManifest {
    const KIND: ManifestKind = ManifestKind::Bundle;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleBuild {
    pub name: String,
    pub version: String,
    pub architecture: String,
    pub id: String,
    /// Archive path, or its public URL when one is configured.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleComponent {
    pub name: String,
    pub repository: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub commit_id: String,
    pub location: String,
}

impl Named for BundleComponent {
    fn name(&self) -> &str {
        &self.name
    }
}
