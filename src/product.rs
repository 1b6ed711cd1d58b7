//! Per-product capabilities.
//!
//! OpenSearch and OpenSearch Dashboards bundles are assembled by the same flow.
//! They differ in the plugin installer shipped inside the distribution, where
//! component install scripts live, and which validator guards each artifact
//! type. Those differences are the [`Product`] trait; nothing else branches on
//! the product.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::build::check::{
    ArtifactCheck, DashboardsPluginCheck, MavenCheck, NoopCheck, PluginCheck,
};
use crate::build::BuildTarget;

pub trait Product: fmt::Debug + Send + Sync {
    /// Build name as it appears in manifests (`OpenSearch`).
    fn name(&self) -> &'static str;

    /// Lowercase, dash separated form used in file names (`opensearch`).
    fn slug(&self) -> &'static str;

    /// Plugin installer, relative to the extracted distribution root.
    fn plugin_cli(&self) -> &'static str;

    /// Where a component's install script may live under `scripts_root`, in
    /// lookup order.
    fn install_script_candidates(&self, scripts_root: &Path, component: &str) -> Vec<PathBuf>;

    /// Validator guarding artifacts of `artifact_type`.
    fn artifact_check(&self, artifact_type: &str, target: &BuildTarget) -> Box<dyn ArtifactCheck>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSearch;

impl Product for OpenSearch {
    fn name(&self) -> &'static str {
        "OpenSearch"
    }

    fn slug(&self) -> &'static str {
        "opensearch"
    }

    fn plugin_cli(&self) -> &'static str {
        "bin/opensearch-plugin"
    }

    fn install_script_candidates(&self, scripts_root: &Path, component: &str) -> Vec<PathBuf> {
        vec![
            scripts_root
                .join("components")
                .join(component)
                .join("install.sh"),
        ]
    }

    fn artifact_check(&self, artifact_type: &str, target: &BuildTarget) -> Box<dyn ArtifactCheck> {
        match artifact_type {
            "plugins" => Box::new(PluginCheck::new(target)),
            "maven" => Box::new(MavenCheck::new(target)),
            _ => Box::new(NoopCheck),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSearchDashboards;

impl Product for OpenSearchDashboards {
    fn name(&self) -> &'static str {
        "OpenSearch Dashboards"
    }

    fn slug(&self) -> &'static str {
        "opensearch-dashboards"
    }

    fn plugin_cli(&self) -> &'static str {
        "bin/opensearch-dashboards-plugin"
    }

    fn install_script_candidates(&self, scripts_root: &Path, component: &str) -> Vec<PathBuf> {
        vec![
            scripts_root
                .join("dashboards")
                .join("components")
                .join(component)
                .join("install.sh"),
        ]
    }

    fn artifact_check(&self, artifact_type: &str, target: &BuildTarget) -> Box<dyn ArtifactCheck> {
        match artifact_type {
            "plugins" => Box::new(DashboardsPluginCheck::new(target)),
            _ => Box::new(NoopCheck),
        }
    }
}

static OPENSEARCH: OpenSearch = OpenSearch;
static OPENSEARCH_DASHBOARDS: OpenSearchDashboards = OpenSearchDashboards;

/// All known products.
pub fn products() -> [&'static dyn Product; 2] {
    [&OPENSEARCH, &OPENSEARCH_DASHBOARDS]
}

/// Resolve a product from a build name or slug.
pub fn product_for(name: &str) -> Result<&'static dyn Product> {
    match products()
        .into_iter()
        .find(|product| product.name() == name || product.slug() == name)
    {
        Some(product) => Ok(product),
        None => bail!(
            "unsupported product '{name}'; expected one of: {}",
            products()
                .iter()
                .map(|product| product.name())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
