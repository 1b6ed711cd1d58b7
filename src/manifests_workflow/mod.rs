//! Discovering and extending the checked-in input manifests.
//!
//! Input manifests live at `<root>/<version>/<slug>-<version>.yml`. Listing
//! files is injectable so tests and callers can supply their own tree.
//!
//! - [`component`] - component variants and lazy version resolution

pub mod component;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::manifest::{Components, InputBuild, InputManifest, Manifest};
use crate::product::Product;

pub use component::{gradle_cmd, Component};

/// Lists candidate files under a manifests root.
pub type FileLister = Box<dyn Fn(&Path) -> Result<Vec<PathBuf>>>;

/// Default lister: every file at most two levels below `root`.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
        let entry = entry.with_context(|| format!("walking '{}'", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub struct InputManifests {
    root: PathBuf,
    product: &'static dyn Product,
    lister: FileLister,
}

impl InputManifests {
    pub fn new(root: impl Into<PathBuf>, product: &'static dyn Product) -> Self {
        Self::with_lister(root, product, Box::new(walk_files))
    }

    pub fn with_lister(
        root: impl Into<PathBuf>,
        product: &'static dyn Product,
        lister: FileLister,
    ) -> Self {
        Self {
            root: root.into(),
            product,
            lister,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<version>/<slug>-<version>.yml`
    pub fn path_for(&self, version: &str) -> PathBuf {
        self.root
            .join(version)
            .join(format!("{}-{version}.yml", self.product.slug()))
    }

    /// Manifest files of this product, ordered by version.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut found: Vec<(String, PathBuf)> = (self.lister)(&self.root)?
            .into_iter()
            .filter_map(|path| {
                let version = self.version_of(&path)?;
                Some((version, path))
            })
            .collect();
        found.sort_by(|(a, _), (b, _)| compare_versions(a, b));
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    pub fn versions(&self) -> Result<Vec<String>> {
        Ok(self
            .files()?
            .iter()
            .filter_map(|path| self.version_of(path))
            .collect())
    }

    pub fn latest(&self) -> Result<Option<String>> {
        Ok(self.versions()?.pop())
    }

    pub fn load(&self) -> Result<Vec<(PathBuf, InputManifest)>> {
        self.files()?
            .into_iter()
            .map(|path| {
                let manifest = InputManifest::from_path(&path)
                    .with_context(|| format!("loading input manifest '{}'", path.display()))?;
                Ok((path, manifest))
            })
            .collect()
    }

    /// Write a new input manifest for `version` listing `components`.
    pub fn write_manifest(&self, version: &str, components: &[Component]) -> Result<PathBuf> {
        let components = Components::new(components.iter().map(Component::to_input).collect())?;
        let manifest = InputManifest::new(
            InputBuild {
                name: self.product.name().to_string(),
                version: version.to_string(),
            },
            components,
        );
        let path = self.path_for(version);
        manifest
            .to_file(&path)
            .with_context(|| format!("writing input manifest '{}'", path.display()))?;
        info!(path = %path.display(), version, "wrote input manifest");
        Ok(path)
    }

    /// The version a path stands for, when it follows this product's layout.
    fn version_of(&self, path: &Path) -> Option<String> {
        let version = path.parent()?.file_name()?.to_str()?;
        let expected = format!("{}-{version}.yml", self.product.slug());
        (path.file_name()?.to_str()? == expected).then(|| version.to_string())
    }
}

/// Numeric, part by part; `0.9.0` sorts before `0.10.0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    fn parts(version: &str) -> Vec<u64> {
        version
            .split(['.', '-'])
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    }
    parts(a).cmp(&parts(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CheckedOutRepository;
    use crate::product::{OpenSearch, OpenSearchDashboards};
    use tempfile::TempDir;

    static OPENSEARCH: OpenSearch = OpenSearch;
    static DASHBOARDS: OpenSearchDashboards = OpenSearchDashboards;

    fn checked_in() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("manifests")
    }

    #[test]
    fn finds_checked_in_opensearch_manifests() {
        let manifests = InputManifests::new(checked_in(), &OPENSEARCH);
        let files = manifests.files().unwrap();
        assert!(files.len() >= 2);
        assert!(files.contains(&checked_in().join("1.1.0/opensearch-1.1.0.yml")));
        assert!(!files
            .iter()
            .any(|f| f.ends_with("opensearch-dashboards-1.1.0.yml")));
    }

    #[test]
    fn finds_checked_in_dashboards_manifests() {
        let manifests = InputManifests::new(checked_in(), &DASHBOARDS);
        assert_eq!(manifests.versions().unwrap(), vec!["1.1.0".to_string()]);
        let loaded = manifests.load().unwrap();
        assert_eq!(loaded[0].1.build.name, "OpenSearch Dashboards");
    }

    #[test]
    fn versions_sort_numerically() {
        let lister: FileLister = Box::new(|root: &Path| {
            Ok(vec![
                root.join("0.10.0/opensearch-0.10.0.yml"),
                root.join("0.9.0/opensearch-0.9.0.yml"),
                root.join("0.9.0/notes.txt"),
                root.join("1.0.0/opensearch-dashboards-1.0.0.yml"),
            ])
        });
        let manifests = InputManifests::with_lister("root", &OPENSEARCH, lister);
        assert_eq!(manifests.versions().unwrap(), vec!["0.9.0", "0.10.0"]);
        assert_eq!(manifests.latest().unwrap().as_deref(), Some("0.10.0"));
    }

    #[test]
    fn writes_new_manifest_at_versioned_path() {
        let tmp = TempDir::new().unwrap();
        let manifests = InputManifests::new(tmp.path(), &OPENSEARCH);
        let components = vec![
            Component::plain(
                "OpenSearch",
                Box::new(CheckedOutRepository::new(
                    "https://github.com/opensearch-project/OpenSearch.git",
                    "main",
                    "sha",
                    tmp.path(),
                )),
                "2.0.0",
            ),
            Component::plain(
                "common-utils",
                Box::new(CheckedOutRepository::new(
                    "https://github.com/opensearch-project/common-utils.git",
                    "main",
                    "sha",
                    tmp.path(),
                )),
                "2.0.0.0",
            ),
        ];

        let path = manifests.write_manifest("2.0.0", &components).unwrap();
        assert_eq!(path, tmp.path().join("2.0.0/opensearch-2.0.0.yml"));

        let written = InputManifest::from_path(&path).unwrap();
        assert_eq!(written.build.name, "OpenSearch");
        assert_eq!(written.build.version, "2.0.0");
        assert_eq!(written.components.names(), vec!["OpenSearch", "common-utils"]);
        assert_eq!(manifests.versions().unwrap(), vec!["2.0.0"]);
    }

    #[test]
    fn compare_versions_orders_parts() {
        assert_eq!(compare_versions("1.2.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("1.1.0", "1.1.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.0.0", "1.99.0"), Ordering::Greater);
    }
}
