//! Typed manifests and their YAML round-trip.
//!
//! - [`input`] - what to build (read once, never written by a run)
//! - [`build`] - what a component build produced, accumulated by the build recorder
//! - [`bundle`] - what an assembled bundle contains, accumulated by the bundle recorder
//!
//! Parsing goes YAML -> JSON value -> schema check -> typed model, so every
//! violation is reported with its nested path before serde sees the document.
//! Serializing the typed model gives the document back with keys in schema order.

pub mod build;
pub mod bundle;
pub mod components;
pub mod input;
pub(crate) mod schema;

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use build::{BuildComponent, BuildInfo, BuildManifest};
pub use bundle::{BundleBuild, BundleComponent, BundleManifest};
pub use components::{Components, Named};
pub use input::{Check, InputBuild, InputComponent, InputManifest};

/// File name every recorder writes its manifest to.
pub const MANIFEST_FILENAME: &str = "manifest.yml";

/// Which of the three document shapes a manifest follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Input,
    Build,
    Bundle,
}

impl ManifestKind {
    pub fn label(self) -> &'static str {
        match self {
            ManifestKind::Input => "input",
            ManifestKind::Build => "build",
            ManifestKind::Bundle => "bundle",
        }
    }
}

/// One schema rule broken at one location of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer into the document (`/components/0/ref`), empty for the root.
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("reading manifest '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid manifest schema: {}", join_violations(.0))]
    Schema(Vec<SchemaViolation>),

    #[error("invalid manifest: {0}")]
    Invalid(String),

    #[error("component '{0}' not found")]
    ComponentNotFound(String),

    #[error("compiling {kind} manifest schema: {message}")]
    SchemaDefinition { kind: &'static str, message: String },
}

/// Shared load/save surface of the three manifest kinds.
pub trait Manifest: Serialize + DeserializeOwned {
    const KIND: ManifestKind;

    /// Check a generic document against this kind's schema and build the model.
    fn from_value(document: Value) -> Result<Self, ManifestError> {
        schema::validate(Self::KIND, &document)?;
        serde_json::from_value(document).map_err(|e| ManifestError::Invalid(e.to_string()))
    }

    fn from_yaml(text: &str) -> Result<Self, ManifestError> {
        let document: Value = serde_yaml::from_str(text)?;
        Self::from_value(document)
    }

    /// Parse from an already opened reader.
    fn from_file(mut reader: impl Read) -> Result<Self, ManifestError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| ManifestError::Io {
                path: PathBuf::from("<reader>"),
                source,
            })?;
        Self::from_yaml(&text)
    }

    fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Generic document form; the exact inverse of [`Manifest::from_value`].
    ///
    /// Keys of each mapping come out in the model's field order, which is the
    /// order the schema lists them in. Only the `artifacts` map keeps the
    /// order it was read or recorded in.
    fn to_value(&self) -> Result<Value, ManifestError> {
        serde_json::to_value(self).map_err(|e| ManifestError::Invalid(e.to_string()))
    }

    /// Same key order as [`Manifest::to_value`]; a document written with
    /// keys in another order reads back equal but is not reproduced byte for byte.
    fn to_yaml(&self) -> Result<String, ManifestError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the YAML document, creating parent directories as needed.
    fn to_file(&self, path: &Path) -> Result<(), ManifestError> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ManifestError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, yaml).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
