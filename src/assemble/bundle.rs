//! Turning a build manifest and its artifacts into one distribution archive.
//!
//! A [`Bundle`] extracts the min tarball into a scoped temporary directory,
//! installs every plugin into it with the product's installer, runs any
//! component install script, then packages the tree. The temporary directory
//! lives as long as the bundle and is removed on drop, whatever the outcome.
//!
//! ```text
//! Created -> BaseExtracted -> Installing* -> Packaged -> ManifestWritten
//!                 \______________\______________\--> Failed
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::archive::{create_tar_gz, extract_tar_gz, single_top_level_dir, write_sha256_sidecar};
use super::{BundleRecorder, ScriptFinder};
use crate::manifest::{BuildComponent, BuildManifest};
use crate::product::{product_for, Product};
use crate::system::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Created,
    BaseExtracted,
    Installing,
    Packaged,
    ManifestWritten,
    Failed,
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssemblyState::Created => "created",
            AssemblyState::BaseExtracted => "base extracted",
            AssemblyState::Installing => "installing",
            AssemblyState::Packaged => "packaged",
            AssemblyState::ManifestWritten => "manifest written",
            AssemblyState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Where the packaged bundle landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedBundle {
    pub tarball: PathBuf,
    pub checksum: PathBuf,
}

pub struct Bundle {
    manifest: BuildManifest,
    product: &'static dyn Product,
    artifacts_dir: PathBuf,
    recorder: BundleRecorder,
    runner: Box<dyn CommandRunner>,
    scripts: ScriptFinder,
    tmp_dir: TempDir,
    min_component: String,
    min_tarball_path: PathBuf,
    archive_path: PathBuf,
    installed_plugins: Vec<String>,
    state: AssemblyState,
}

impl Bundle {
    /// Locate and extract the min tarball. Plugins are installed afterwards.
    pub fn create(
        manifest: BuildManifest,
        artifacts_dir: impl Into<PathBuf>,
        recorder: BundleRecorder,
        runner: Box<dyn CommandRunner>,
        scripts: ScriptFinder,
    ) -> Result<Self> {
        let artifacts_dir = artifacts_dir.into();
        let product = product_for(&manifest.build.name)?;

        let min = manifest
            .iter_components()
            .find(|component| component.has_artifact_type("dist"))
            .ok_or_else(|| anyhow!("Missing min \"dist\" in input artifacts."))?;
        let min_rel = first_artifact(min, "dist")?.to_string();
        let min_component = min.name.clone();
        let min_tarball_path = artifacts_dir.join(&min_rel);

        let tmp_dir = TempDir::new().context("creating bundle working directory")?;
        let mut bundle = Self {
            manifest,
            product,
            artifacts_dir,
            recorder,
            runner,
            scripts,
            tmp_dir,
            min_component,
            min_tarball_path,
            archive_path: PathBuf::new(),
            installed_plugins: Vec::new(),
            state: AssemblyState::Created,
        };
        bundle.extract_min(&min_rel)?;
        Ok(bundle)
    }

    fn extract_min(&mut self, min_rel: &str) -> Result<()> {
        let dest = self.tmp_dir.path().join("min");
        info!(tarball = %self.min_tarball_path.display(), "extracting min tarball");
        let extracted = extract_tar_gz(&self.min_tarball_path, &dest)
            .and_then(|()| single_top_level_dir(&dest));
        match extracted {
            Ok(archive_path) => {
                self.archive_path = archive_path;
                let min = self.manifest.component(&self.min_component)?.clone();
                self.recorder.record_component(&min, min_rel);
                self.state = AssemblyState::BaseExtracted;
                Ok(())
            }
            Err(err) => {
                self.state = AssemblyState::Failed;
                Err(err.context(format!(
                    "extracting min tarball '{}'",
                    self.min_tarball_path.display()
                )))
            }
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn product(&self) -> &'static dyn Product {
        self.product
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn min_tarball(&self) -> Result<&BuildComponent> {
        Ok(self.manifest.component(&self.min_component)?)
    }

    pub fn min_tarball_path(&self) -> &Path {
        &self.min_tarball_path
    }

    /// Root of the extracted distribution that plugins are installed into.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn tmp_dir(&self) -> &Path {
        self.tmp_dir.path()
    }

    pub fn recorder(&self) -> &BundleRecorder {
        &self.recorder
    }

    pub fn installed_plugins(&self) -> &[String] {
        &self.installed_plugins
    }

    /// Components carrying `plugins` artifacts, in manifest order.
    pub fn plugins(&self) -> Vec<&BuildComponent> {
        self.manifest
            .iter_components()
            .filter(|c| c.name != self.min_component && c.has_artifact_type("plugins"))
            .collect()
    }

    /// Install every plugin, in manifest order, stopping at the first failure.
    pub fn install_plugins(&mut self) -> Result<()> {
        let names: Vec<String> = self.plugins().iter().map(|c| c.name.clone()).collect();
        for name in names {
            self.install_plugin(&name)?;
        }
        Ok(())
    }

    pub fn install_plugin(&mut self, name: &str) -> Result<()> {
        self.require_state(
            &[AssemblyState::BaseExtracted, AssemblyState::Installing],
            "install a plugin",
        )?;
        if self.installed_plugins.iter().any(|installed| installed == name) {
            bail!("component '{name}' is already installed");
        }

        match self.try_install_plugin(name) {
            Ok(()) => {
                self.installed_plugins.push(name.to_string());
                self.state = AssemblyState::Installing;
                Ok(())
            }
            Err(err) => {
                self.state = AssemblyState::Failed;
                Err(err.context(format!("installing component '{name}'")))
            }
        }
    }

    fn try_install_plugin(&mut self, name: &str) -> Result<()> {
        let component = self.manifest.component(name)?.clone();
        let rel = first_artifact(&component, "plugins")?;

        let staged = self.stage_artifact(rel)?;
        let cli = self.archive_path.join(self.product.plugin_cli());
        let install = format!(
            "\"{}\" --allow-root install \"file:{}\"",
            cli.display(),
            staged.display()
        );
        info!(component = name, "installing plugin");
        self.runner.run(&install, &self.archive_path)?;

        match self.scripts.find_install_script(self.product, name) {
            Some(script) => {
                let command = format!(
                    "\"{}\" -a \"{}\" -o \"{}\"",
                    script.display(),
                    self.artifacts_dir.display(),
                    self.archive_path.display()
                );
                info!(component = name, script = %script.display(), "running install script");
                self.runner.run(&command, &self.archive_path)?;
            }
            None => debug!(component = name, "no install script"),
        }

        self.recorder.record_component(&component, rel);
        Ok(())
    }

    /// Copy an artifact into the working directory, keeping its file name.
    fn stage_artifact(&self, rel: &str) -> Result<PathBuf> {
        let source = self.artifacts_dir.join(rel);
        let file_name = source
            .file_name()
            .ok_or_else(|| anyhow!("artifact path '{rel}' has no file name"))?;
        let staged = self.tmp_dir.path().join(file_name);
        fs::copy(&source, &staged).with_context(|| {
            format!(
                "copying '{}' to '{}'",
                source.display(),
                staged.display()
            )
        })?;
        Ok(staged)
    }

    /// Write the bundle manifest into the archive, then pack the archive into
    /// `dest_dir` with a checksum beside it.
    pub fn package(&mut self, dest_dir: &Path) -> Result<PackagedBundle> {
        self.require_state(
            &[AssemblyState::BaseExtracted, AssemblyState::Installing],
            "package",
        )?;
        match self.try_package(dest_dir) {
            Ok(packaged) => {
                self.state = AssemblyState::Packaged;
                Ok(packaged)
            }
            Err(err) => {
                self.state = AssemblyState::Failed;
                Err(err)
            }
        }
    }

    fn try_package(&self, dest_dir: &Path) -> Result<PackagedBundle> {
        self.recorder.write_manifest(&self.archive_path)?;
        fs::create_dir_all(dest_dir)
            .with_context(|| format!("creating '{}'", dest_dir.display()))?;

        let tarball = dest_dir.join(self.recorder.tar_name());
        info!(tarball = %tarball.display(), "packaging bundle");
        create_tar_gz(&self.archive_path, &tarball)
            .with_context(|| format!("packaging '{}'", tarball.display()))?;
        let checksum = write_sha256_sidecar(&tarball)?;
        Ok(PackagedBundle { tarball, checksum })
    }

    /// Write the bundle manifest beside the packaged tarball.
    pub fn write_manifest(&mut self, dest_dir: &Path) -> Result<PathBuf> {
        self.require_state(&[AssemblyState::Packaged], "write the bundle manifest")?;
        let path = self.recorder.write_manifest(dest_dir)?;
        self.state = AssemblyState::ManifestWritten;
        Ok(path)
    }

    fn require_state(&self, allowed: &[AssemblyState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        if self.state == AssemblyState::Failed {
            warn!(action, "bundle assembly already failed");
        }
        bail!("cannot {action}: bundle is {}", self.state)
    }
}

fn first_artifact<'a>(component: &'a BuildComponent, artifact_type: &str) -> Result<&'a str> {
    component
        .artifacts_of(artifact_type)
        .first()
        .map(String::as_str)
        .ok_or_else(|| {
            anyhow!(
                "component '{}' has no \"{artifact_type}\" artifacts",
                component.name
            )
        })
}
