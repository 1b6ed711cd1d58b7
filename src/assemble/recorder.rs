//! Bundle manifest accumulation.
//!
//! Every location is computed twice over: callers pass the path relative to
//! the published tree and the local absolute path, and the recorder emits the
//! public URL when a base URL is configured, the local path otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::manifest::{
    BuildComponent, BuildInfo, BundleBuild, BundleComponent, BundleManifest, Components,
    Manifest, MANIFEST_FILENAME,
};

/// Platform part of bundle names.
pub const PLATFORM: &str = "linux";

#[derive(Debug, Clone)]
pub struct BundleRecorder {
    build: BuildInfo,
    output_dir: PathBuf,
    artifacts_dir: PathBuf,
    public_url: Option<String>,
    tar_name: String,
    components: Components<BundleComponent>,
}

impl BundleRecorder {
    pub fn new(
        build: &BuildInfo,
        output_dir: impl Into<PathBuf>,
        artifacts_dir: impl Into<PathBuf>,
        public_url: Option<String>,
    ) -> Self {
        Self {
            tar_name: tar_name(build),
            build: build.clone(),
            output_dir: output_dir.into(),
            artifacts_dir: artifacts_dir.into(),
            public_url: public_url.filter(|url| !url.is_empty()),
            components: Components::default(),
        }
    }

    /// `<product-slug>-<version>-linux-<arch>.tar.gz`
    pub fn tar_name(&self) -> &str {
        &self.tar_name
    }

    pub fn public_url(&self) -> Option<&str> {
        self.public_url.as_deref()
    }

    pub fn set_public_url(&mut self, public_url: Option<String>) {
        self.public_url = public_url.filter(|url| !url.is_empty());
    }

    /// List `component` as living at `rel` under the artifacts directory.
    pub fn record_component(&mut self, component: &BuildComponent, rel: &str) {
        let location = self.location("builds", rel, &self.artifacts_dir.join(rel));
        info!(component = %component.name, %location, "recording bundle component");
        self.components.upsert(BundleComponent {
            name: component.name.clone(),
            repository: component.repository.clone(),
            git_ref: component.git_ref.clone(),
            commit_id: component.commit_id.clone(),
            location,
        });
    }

    /// `absolute` when no public URL is set, otherwise
    /// `<url>/<category>/<version>/<build id>/<arch>/<rel>`.
    pub fn location(&self, category: &str, rel: &str, absolute: &Path) -> String {
        match &self.public_url {
            None => absolute.display().to_string(),
            Some(base) => format!(
                "{}/{category}/{}/{}/{}/{rel}",
                base.trim_end_matches('/'),
                self.build.version,
                self.build.id,
                self.build.architecture
            ),
        }
    }

    pub fn get_manifest(&self) -> BundleManifest {
        let location = self.location(
            "bundles",
            &self.tar_name,
            &self.output_dir.join(&self.tar_name),
        );
        let mut manifest = BundleManifest::new(BundleBuild {
            name: self.build.name.clone(),
            version: self.build.version.clone(),
            architecture: self.build.architecture.clone(),
            id: self.build.id.clone(),
            location,
        });
        manifest.components = (!self.components.is_empty()).then(|| self.components.clone());
        manifest
    }

    pub fn write_manifest(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILENAME);
        self.get_manifest()
            .to_file(&path)
            .with_context(|| format!("writing bundle manifest '{}'", path.display()))?;
        info!(path = %path.display(), "wrote bundle manifest");
        Ok(path)
    }
}

fn tar_name(build: &BuildInfo) -> String {
    let slug = build.name.to_lowercase().replace(' ', "-");
    format!(
        "{slug}-{}-{PLATFORM}-{}.tar.gz",
        build.version, build.architecture
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;
    use tempfile::TempDir;

    const PUBLIC_URL: &str = "https://ci.opensearch.org/ci/os-distro-prod";

    fn build(name: &str, id: &str) -> BuildInfo {
        BuildInfo {
            name: name.into(),
            version: "1.1.0".into(),
            architecture: "x64".into(),
            id: id.into(),
        }
    }

    fn recorder() -> BundleRecorder {
        BundleRecorder::new(
            &build("OpenSearch", "c3ff7a232d25403fa8cc14c97799c323"),
            "output_dir",
            "artifacts_dir",
            None,
        )
    }

    fn component(name: &str, repository: &str, commit_id: &str) -> BuildComponent {
        BuildComponent {
            name: name.into(),
            repository: repository.into(),
            git_ref: "main".into(),
            commit_id: commit_id.into(),
            artifacts: IndexMap::new(),
            version: "1.0".into(),
        }
    }

    fn job_scheduler() -> BuildComponent {
        component(
            "job_scheduler",
            "https://github.com/opensearch-project/job_scheduler",
            "3913d7097934cbfe1fdcf919347f22a597d00b76",
        )
    }

    #[test]
    fn records_local_locations() {
        let mut recorder = recorder();
        recorder.record_component(&job_scheduler(), "plugins");
        assert_eq!(
            recorder.get_manifest().to_value().unwrap(),
            json!({
                "schema-version": "1.0",
                "build": {
                    "name": "OpenSearch",
                    "version": "1.1.0",
                    "architecture": "x64",
                    "id": "c3ff7a232d25403fa8cc14c97799c323",
                    "location": "output_dir/opensearch-1.1.0-linux-x64.tar.gz"
                },
                "components": [{
                    "name": "job_scheduler",
                    "repository": "https://github.com/opensearch-project/job_scheduler",
                    "ref": "main",
                    "commit_id": "3913d7097934cbfe1fdcf919347f22a597d00b76",
                    "location": "artifacts_dir/plugins"
                }]
            })
        );
    }

    #[test]
    fn empty_manifest_carries_the_bundle_location() {
        assert_eq!(
            recorder().get_manifest().to_value().unwrap(),
            json!({
                "schema-version": "1.0",
                "build": {
                    "name": "OpenSearch",
                    "version": "1.1.0",
                    "architecture": "x64",
                    "id": "c3ff7a232d25403fa8cc14c97799c323",
                    "location": "output_dir/opensearch-1.1.0-linux-x64.tar.gz"
                }
            })
        );
    }

    #[test]
    fn records_public_component_locations() {
        let mut recorder = recorder();
        recorder.set_public_url(Some(PUBLIC_URL.into()));
        recorder.record_component(&job_scheduler(), "plugins");
        let manifest = recorder.get_manifest();
        assert_eq!(
            manifest.component("job_scheduler").unwrap().location,
            "https://ci.opensearch.org/ci/os-distro-prod/builds/1.1.0/c3ff7a232d25403fa8cc14c97799c323/x64/plugins"
        );
        assert_eq!(
            manifest.build.location,
            "https://ci.opensearch.org/ci/os-distro-prod/bundles/1.1.0/c3ff7a232d25403fa8cc14c97799c323/x64/opensearch-1.1.0-linux-x64.tar.gz"
        );
    }

    #[test]
    fn location_scenarios() {
        let mut recorder = recorder();
        let absolute = Path::new("/tmp/builds/foo/dir1/dir2/file");

        assert_eq!(
            recorder.location("builds", "dir1/dir2/file", absolute),
            "/tmp/builds/foo/dir1/dir2/file"
        );

        let expected = "https://ci.opensearch.org/ci/os-distro-prod/builds/1.1.0/c3ff7a232d25403fa8cc14c97799c323/x64/dir1/dir2/file";
        recorder.set_public_url(Some(PUBLIC_URL.into()));
        assert_eq!(recorder.location("builds", "dir1/dir2/file", absolute), expected);

        recorder.set_public_url(Some(format!("{PUBLIC_URL}/")));
        assert_eq!(recorder.location("builds", "dir1/dir2/file", absolute), expected);

        recorder.set_public_url(Some(String::new()));
        assert_eq!(
            recorder.location("builds", "dir1/dir2/file", absolute),
            "/tmp/builds/foo/dir1/dir2/file"
        );
    }

    #[test]
    fn tar_names() {
        assert_eq!(recorder().tar_name(), "opensearch-1.1.0-linux-x64.tar.gz");
        let dashboards = BundleRecorder::new(
            &build("OpenSearch Dashboards", "c94ebec444a94ada86a230c9297b1d73"),
            "output_dir",
            "artifacts_dir",
            None,
        );
        assert_eq!(
            dashboards.tar_name(),
            "opensearch-dashboards-1.1.0-linux-x64.tar.gz"
        );
    }

    #[test]
    fn dashboards_component_locations() {
        let mut recorder = BundleRecorder::new(
            &build("OpenSearch Dashboards", "c94ebec444a94ada86a230c9297b1d73"),
            "output_dir",
            "artifacts_dir",
            None,
        );
        recorder.record_component(
            &component(
                "alertingDashboards",
                "https://github.com/opensearch-project/alerting-dashboards-plugin",
                "ae789280740d7000d1f13245019414abeedfc286",
            ),
            "plugins",
        );
        let manifest = recorder.get_manifest();
        assert_eq!(
            manifest.build.location,
            "output_dir/opensearch-dashboards-1.1.0-linux-x64.tar.gz"
        );
        assert_eq!(
            manifest.component("alertingDashboards").unwrap().location,
            "artifacts_dir/plugins"
        );
    }

    #[test]
    fn write_manifest_round_trips() {
        let tmp = TempDir::new().unwrap();
        let mut recorder = recorder();
        recorder.record_component(&job_scheduler(), "plugins");
        let path = recorder.write_manifest(tmp.path()).unwrap();
        assert_eq!(path, tmp.path().join("manifest.yml"));
        assert_eq!(BundleManifest::from_path(&path).unwrap(), recorder.get_manifest());
    }
}
