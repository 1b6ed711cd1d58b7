//! Build manifest accumulation.
//!
//! One recorder per build run. Components are registered as their builds
//! start; every artifact a build produces goes through [`BuildRecorder::record_artifact`],
//! which validates it, copies it under the output directory and only then
//! lists it in the manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{debug, info};

use super::BuildTarget;
use crate::git::SourceRepository;
use crate::manifest::{
    BuildComponent, BuildInfo, BuildManifest, Components, Manifest, ManifestError,
    MANIFEST_FILENAME,
};
use crate::product::{product_for, Product};

#[derive(Debug)]
pub struct BuildRecorder {
    target: BuildTarget,
    product: &'static dyn Product,
    components: Components<BuildComponent>,
}

impl BuildRecorder {
    /// Recorder for `target`; the product is resolved from the target name.
    pub fn new(target: BuildTarget) -> Result<Self> {
        let product = product_for(&target.name)?;
        Ok(Self::with_product(target, product))
    }

    pub fn with_product(target: BuildTarget, product: &'static dyn Product) -> Self {
        Self {
            target,
            product,
            components: Components::default(),
        }
    }

    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// Register `name` as built from `repo`. Re-registering replaces the
    /// previous entry, artifacts included.
    pub fn record_component(&mut self, name: &str, repo: &dyn SourceRepository) {
        info!(
            component = name,
            repository = repo.url(),
            git_ref = repo.git_ref(),
            "recording component"
        );
        self.components.upsert(BuildComponent {
            name: name.to_string(),
            repository: repo.url().to_string(),
            git_ref: repo.git_ref().to_string(),
            commit_id: repo.sha().to_string(),
            artifacts: IndexMap::new(),
            version: self.target.component_version(),
        });
    }

    /// Validate `source`, copy it to `<output_dir>/<dest>` and list `dest`
    /// under `artifact_type`. Nothing is listed unless both steps succeed.
    pub fn record_artifact(
        &mut self,
        component: &str,
        artifact_type: &str,
        dest: &str,
        source: &Path,
    ) -> Result<()> {
        if self.components.find(component).is_none() {
            return Err(ManifestError::ComponentNotFound(component.to_string()))
                .with_context(|| format!("recording artifact '{dest}'"));
        }

        debug!(component, artifact_type, path = %source.display(), "checking artifact");
        self.product
            .artifact_check(artifact_type, &self.target)
            .check(source)?;

        let dest_path = self.target.output_dir.join(dest);
        copy_artifact(source, &dest_path)?;

        info!(component, artifact_type, dest, "recorded artifact");
        if let Some(entry) = self.components.find_mut(component) {
            entry
                .artifacts
                .entry(artifact_type.to_string())
                .or_default()
                .push(dest.to_string());
        }
        Ok(())
    }

    pub fn get_manifest(&self) -> BuildManifest {
        BuildManifest::new(
            BuildInfo {
                name: self.target.name.clone(),
                version: self.target.opensearch_version(),
                architecture: self.target.arch.clone(),
                id: self.target.build_id.clone(),
            },
            self.components.clone(),
        )
    }

    /// Write `manifest.yml` into the target's output directory.
    pub fn write_manifest(&self) -> Result<PathBuf> {
        self.write_manifest_to(&self.target.output_dir)
    }

    pub fn write_manifest_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILENAME);
        self.get_manifest()
            .to_file(&path)
            .with_context(|| format!("writing build manifest '{}'", path.display()))?;
        info!(path = %path.display(), "wrote build manifest");
        Ok(path)
    }
}

fn copy_artifact(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory '{}'", parent.display()))?;
    }
    fs::copy(source, dest).with_context(|| {
        format!(
            "copying artifact '{}' to '{}'",
            source.display(),
            dest.display()
        )
    })?;
    Ok(())
}
