//! Identity of one build run.

use std::path::PathBuf;

use anyhow::Result;
use uuid::Uuid;

use crate::system::current_arch;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "artifacts";

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Product, version, architecture and build id of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub arch: String,
    pub snapshot: bool,
    pub output_dir: PathBuf,
    pub build_id: String,
}

impl BuildTarget {
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> BuildTargetBuilder {
        BuildTargetBuilder {
            name: name.into(),
            version: version.into(),
            platform: "linux".to_string(),
            arch: None,
            snapshot: false,
            output_dir: None,
            build_id: None,
        }
    }

    /// Product version, e.g. `1.1.0` or `1.1.0-SNAPSHOT`.
    pub fn opensearch_version(&self) -> String {
        if self.snapshot {
            format!("{}{SNAPSHOT_SUFFIX}", self.version)
        } else {
            self.version.clone()
        }
    }

    /// Four-part component version, e.g. `1.1.0.0` or `1.1.0.0-SNAPSHOT`.
    pub fn component_version(&self) -> String {
        if self.snapshot {
            format!("{}.0{SNAPSHOT_SUFFIX}", self.version)
        } else {
            format!("{}.0", self.version)
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildTargetBuilder {
    name: String,
    version: String,
    platform: String,
    arch: Option<String>,
    snapshot: bool,
    output_dir: Option<PathBuf>,
    build_id: Option<String>,
}

impl BuildTargetBuilder {
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn snapshot(mut self, snapshot: bool) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }

    /// Resolve against the process environment and the host architecture.
    pub fn build(self) -> Result<BuildTarget> {
        self.build_with_env(|key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn build_with_env(self, env: impl Fn(&str) -> Option<String>) -> Result<BuildTarget> {
        let arch = match self.arch {
            Some(arch) => arch,
            None => current_arch()?.to_string(),
        };
        let build_id = resolve_build_id(&self.name, self.build_id, env);
        Ok(BuildTarget {
            name: self.name,
            version: self.version,
            platform: self.platform,
            arch,
            snapshot: self.snapshot,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            build_id,
        })
    }
}

/// Name of the environment variable overriding the build id of `product`.
///
/// `OpenSearch` -> `OPENSEARCH_BUILD_ID`,
/// `OpenSearch Dashboards` -> `OPENSEARCH_DASHBOARDS_BUILD_ID`.
pub fn build_id_env_var(product: &str) -> String {
    let mut var = String::new();
    for ch in product.chars() {
        if ch.is_ascii_alphanumeric() {
            var.push(ch.to_ascii_uppercase());
        } else if !var.is_empty() && !var.ends_with('_') {
            var.push('_');
        }
    }
    let trimmed = var.trim_end_matches('_');
    format!("{trimmed}_BUILD_ID")
}

/// Explicit id, then the product's environment override, then a fresh 32-char hex id.
pub fn resolve_build_id(
    product: &str,
    explicit: Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> String {
    explicit
        .filter(|id| !id.is_empty())
        .or_else(|| env(&build_id_env_var(product)).filter(|id| !id.is_empty()))
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}
