//! Components as checked out for manifest discovery.
//!
//! The three variants share name, repository and ref. They differ in how the
//! version is found: declared up front, asked from gradle, or read from
//! `package.json`. Versions are resolved on first use and cached.

use std::cell::OnceCell;

use anyhow::{anyhow, Context, Result};

use crate::config_file::ConfigFile;
use crate::git::SourceRepository;
use crate::manifest::InputComponent;

pub enum Component {
    Plain(PlainComponent),
    OpenSearch(OpenSearchComponent),
    Dashboards(DashboardsComponent),
}

impl Component {
    pub fn plain(
        name: impl Into<String>,
        repo: Box<dyn SourceRepository>,
        version: impl Into<String>,
    ) -> Self {
        Component::Plain(PlainComponent {
            name: name.into(),
            repo,
            version: version.into(),
        })
    }

    /// OpenSearch core when `opensearch_version` is `None`, otherwise a plugin
    /// built against that version. `snapshot` is passed to gradle as `build.snapshot`.
    pub fn opensearch(
        name: impl Into<String>,
        repo: Box<dyn SourceRepository>,
        opensearch_version: Option<String>,
        snapshot: bool,
    ) -> Self {
        Component::OpenSearch(OpenSearchComponent {
            name: name.into(),
            repo,
            opensearch_version,
            snapshot,
            properties: OnceCell::new(),
        })
    }

    pub fn dashboards(name: impl Into<String>, repo: Box<dyn SourceRepository>) -> Self {
        Component::Dashboards(DashboardsComponent {
            name: name.into(),
            repo,
            version: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Plain(c) => &c.name,
            Component::OpenSearch(c) => &c.name,
            Component::Dashboards(c) => &c.name,
        }
    }

    fn repo(&self) -> &dyn SourceRepository {
        match self {
            Component::Plain(c) => c.repo.as_ref(),
            Component::OpenSearch(c) => c.repo.as_ref(),
            Component::Dashboards(c) => c.repo.as_ref(),
        }
    }

    pub fn repository(&self) -> &str {
        self.repo().url()
    }

    pub fn git_ref(&self) -> &str {
        self.repo().git_ref()
    }

    pub fn version(&self) -> Result<&str> {
        match self {
            Component::Plain(c) => Ok(&c.version),
            Component::OpenSearch(c) => c.version(),
            Component::Dashboards(c) => c.version(),
        }
    }

    /// Entry for an input manifest.
    pub fn to_input(&self) -> InputComponent {
        InputComponent {
            name: self.name().to_string(),
            repository: self.repository().to_string(),
            git_ref: self.git_ref().to_string(),
            checks: None,
        }
    }
}

pub struct PlainComponent {
    name: String,
    repo: Box<dyn SourceRepository>,
    version: String,
}

pub struct OpenSearchComponent {
    name: String,
    repo: Box<dyn SourceRepository>,
    opensearch_version: Option<String>,
    snapshot: bool,
    properties: OnceCell<ConfigFile>,
}

impl OpenSearchComponent {
    pub fn is_snapshot(&self) -> bool {
        self.snapshot
    }

    fn gradle_props(&self) -> Vec<(&str, String)> {
        let mut props = Vec::new();
        if let Some(version) = &self.opensearch_version {
            props.push(("opensearch.version", version.clone()));
        }
        props.push(("build.snapshot", self.snapshot.to_string()));
        props
    }

    /// Output of `./gradlew properties`, run once.
    pub fn properties(&self) -> Result<&ConfigFile> {
        if let Some(properties) = self.properties.get() {
            return Ok(properties);
        }
        let props = self.gradle_props();
        let props: Vec<(&str, &str)> = props.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let command = gradle_cmd("properties", &props);
        let output = self
            .repo
            .output(&command)
            .with_context(|| format!("reading gradle properties of '{}'", self.name))?;
        Ok(self
            .properties
            .get_or_init(|| ConfigFile::from_properties(&output)))
    }

    pub fn version(&self) -> Result<&str> {
        self.properties()?
            .get_value("version")
            .and_then(|value| value.as_str())
            .filter(|version| !version.is_empty())
            .ok_or_else(|| anyhow!("gradle properties of '{}' carry no version", self.name))
    }
}

pub struct DashboardsComponent {
    name: String,
    repo: Box<dyn SourceRepository>,
    version: OnceCell<String>,
}

impl DashboardsComponent {
    pub fn version(&self) -> Result<&str> {
        if let Some(version) = self.version.get() {
            return Ok(version);
        }
        let package = self.repo.dir().join("package.json");
        let version = ConfigFile::from_file(&package)?
            .get_str("version")
            .ok_or_else(|| anyhow!("'{}' carries no version", package.display()))?;
        Ok(self.version.get_or_init(|| version))
    }
}

/// `./gradlew <target> -Dk=v ...`, properties in the given order.
pub fn gradle_cmd(target: &str, props: &[(&str, &str)]) -> String {
    let mut command = format!("./gradlew {target}");
    for (key, value) in props {
        command.push_str(&format!(" -D{key}={value}"));
    }
    command
}
