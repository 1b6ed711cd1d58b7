//! Per-component install scripts.

use std::path::{Path, PathBuf};

use crate::product::Product;

/// Looks up optional post-install scripts under a scripts root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFinder {
    root: PathBuf,
}

impl ScriptFinder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing candidate for `component`, if any.
    pub fn find_install_script(&self, product: &dyn Product, component: &str) -> Option<PathBuf> {
        product
            .install_script_candidates(&self.root, component)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}
