//! Optional workflow configuration (`bundle-workflow.toml`).
//!
//! ```toml
//! public_url = "https://ci.opensearch.org/ci/dbc"
//! scripts_dir = "scripts"
//! output_dir = "bundle"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! Command line flags and environment variables take precedence over
//! anything set here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "bundle-workflow.toml";

/// Environment variable for the public artifact base URL.
pub const PUBLIC_URL_VAR: &str = "PUBLIC_ARTIFACT_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub public_url: Option<String>,
    pub scripts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkflowToml {
    public_url: Option<String>,
    scripts_dir: Option<String>,
    output_dir: Option<String>,
}

impl WorkflowConfig {
    /// Load `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading workflow config '{}'", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base)
            .with_context(|| format!("parsing workflow config '{}'", path.display()))
    }

    pub fn parse(text: &str, base: &Path) -> Result<Self> {
        let parsed: WorkflowToml = toml::from_str(text)?;
        Ok(Self {
            public_url: parsed.public_url.filter(|url| !url.trim().is_empty()),
            scripts_dir: parsed.scripts_dir.map(|dir| resolve_path(base, &dir)),
            output_dir: parsed.output_dir.map(|dir| resolve_path(base, &dir)),
        })
    }
}

fn resolve_path(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
