//! Artifact validators run before an artifact is copied into the output tree.
//!
//! A validator is built from the [`BuildTarget`](crate::build::BuildTarget) of the run and inspects one
//! file. Which validator applies is decided per artifact type by the product
//! (see [`crate::product::Product::artifact_check`]); unknown types get
//! [`NoopCheck`].

mod dashboards;
mod maven;
mod plugin;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config_file::{ConfigCheckError, ConfigFile};

pub use dashboards::DashboardsPluginCheck;
pub use maven::MavenCheck;
pub use plugin::PluginCheck;

/// Why an artifact was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    NotAZip,
    FilenameMissingVersion { expected: String },
    InvalidExtension { extension: String },
    Config(ConfigCheckError),
    Unreadable(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NotAZip => write!(f, "Not a zip file."),
            InvalidReason::FilenameMissingVersion { expected } => {
                write!(f, "Expected filename to include {expected}.")
            }
            InvalidReason::InvalidExtension { extension } => {
                write!(f, "{extension} is not a valid extension for a maven file.")
            }
            InvalidReason::Config(err) => write!(f, "{err}"),
            InvalidReason::Unreadable(message) => write!(f, "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Artifact {} is invalid. {reason}", path.display())]
pub struct ArtifactInvalidError {
    pub path: PathBuf,
    pub reason: InvalidReason,
}

impl ArtifactInvalidError {
    pub fn new(path: &Path, reason: InvalidReason) -> Self {
        Self {
            path: path.to_path_buf(),
            reason,
        }
    }
}

pub trait ArtifactCheck {
    fn check(&self, path: &Path) -> Result<(), ArtifactInvalidError>;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCheck;

impl ArtifactCheck for NoopCheck {
    fn check(&self, _path: &Path) -> Result<(), ArtifactInvalidError> {
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn require_filename_version(path: &Path, expected: &str) -> Result<(), ArtifactInvalidError> {
    if file_name(path).contains(expected) {
        return Ok(());
    }
    Err(ArtifactInvalidError::new(
        path,
        InvalidReason::FilenameMissingVersion {
            expected: expected.to_string(),
        },
    ))
}

/// Load a properties-style entry from a zip archive.
///
/// A missing entry reads as an empty document so that key checks report
/// "none was found" rather than an I/O failure.
fn read_zip_properties(path: &Path, entry: &str) -> Result<ConfigFile, ArtifactInvalidError> {
    let unreadable =
        |message: String| ArtifactInvalidError::new(path, InvalidReason::Unreadable(message));

    let file = File::open(path).map_err(|e| unreadable(format!("Unable to open: {e}.")))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| unreadable(format!("Unable to read zip: {e}.")))?;

    let mut text = String::new();
    match archive.by_name(entry) {
        Ok(mut zipped) => {
            zipped
                .read_to_string(&mut text)
                .map_err(|e| unreadable(format!("Unable to read {entry}: {e}.")))?;
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(unreadable(format!("Unable to read {entry}: {e}."))),
    }
    Ok(ConfigFile::from_properties(&text))
}
