//! Source repositories, as seen by recorders and manifest discovery.
//!
//! Cloning and fetching happen elsewhere. What this crate needs from a
//! repository is its identity (url, ref, resolved sha), its checkout directory
//! and the ability to run a command inside it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::system::process;

/// Environment variable holding a token for private auxiliary repositories.
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

pub trait SourceRepository {
    fn url(&self) -> &str;
    fn git_ref(&self) -> &str;
    /// Resolved commit id of `git_ref`.
    fn sha(&self) -> &str;
    fn dir(&self) -> &Path;
    /// Run `command` in the checkout and return its stdout.
    fn output(&self, command: &str) -> Result<String>;
}

/// A repository already checked out at `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedOutRepository {
    url: String,
    git_ref: String,
    sha: String,
    dir: PathBuf,
}

impl CheckedOutRepository {
    pub fn new(
        url: impl Into<String>,
        git_ref: impl Into<String>,
        sha: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            git_ref: git_ref.into(),
            sha: sha.into(),
            dir: dir.into(),
        }
    }

    /// Open a checkout, resolving its sha with `git rev-parse HEAD`.
    pub fn open(url: impl Into<String>, git_ref: impl Into<String>, dir: &Path) -> Result<Self> {
        let sha = process::output("git rev-parse HEAD", dir)
            .with_context(|| format!("resolving HEAD of '{}'", dir.display()))?;
        Ok(Self::new(url, git_ref, sha.trim(), dir))
    }
}

impl SourceRepository for CheckedOutRepository {
    fn url(&self) -> &str {
        &self.url
    }

    fn git_ref(&self) -> &str {
        &self.git_ref
    }

    fn sha(&self) -> &str {
        &self.sha
    }

    fn dir(&self) -> &Path {
        &self.dir
    }

    fn output(&self, command: &str) -> Result<String> {
        Ok(process::output(command, &self.dir)?.trim().to_string())
    }
}

/// Embed `token` into an `https://` clone URL. Other URLs are returned as is.
pub fn authenticated_url(url: &str, token: Option<&str>) -> String {
    match (token.filter(|t| !t.is_empty()), url.strip_prefix("https://")) {
        (Some(token), Some(rest)) => format!("https://{token}@{rest}"),
        _ => url.to_string(),
    }
}

/// [`authenticated_url`] with the token read from `GITHUB_TOKEN`.
pub fn github_url(url: &str) -> String {
    let token = std::env::var(GITHUB_TOKEN_VAR).ok();
    authenticated_url(url, token.as_deref())
}
