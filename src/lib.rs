//! Manifest-driven recording and assembly of OpenSearch distribution bundles.
//!
//! A release is described by an input manifest. Each component build reports
//! its artifacts to a [`BuildRecorder`], which validates and copies them and
//! accumulates a build manifest. A [`Bundle`] then turns that build manifest
//! and its artifacts into one archive, with a bundle manifest that mirrors
//! what the archive contains.
//!
//! # Architecture
//!
//! ```text
//! input manifest ──> (component builds) ──> BuildRecorder ──> manifest.yml
//!                                               │
//!                                     ArtifactCheck per type
//!
//! build manifest + artifacts ──> Bundle ──> installer / install scripts
//!                                   │
//!                             BundleRecorder ──> <product>-<version>-linux-<arch>.tar.gz
//!                                                + .sha256 + manifest.yml
//! ```
//!
//! OpenSearch and OpenSearch Dashboards differ only through the [`Product`]
//! trait: installer path, install-script layout and artifact validators.
//!
//! # Example
//!
//! ```rust,ignore
//! use bundle_workflow::build::{BuildRecorder, BuildTarget};
//! use bundle_workflow::git::CheckedOutRepository;
//!
//! let target = BuildTarget::builder("OpenSearch", "1.1.0").snapshot(true).build()?;
//! let mut recorder = BuildRecorder::new(target)?;
//! let repo = CheckedOutRepository::open(url, "main", checkout_dir)?;
//! recorder.record_component("job-scheduler", &repo);
//! recorder.record_artifact("job-scheduler", "plugins", "plugins/job-scheduler-1.1.0.0-SNAPSHOT.zip", &zip)?;
//! recorder.write_manifest()?;
//! ```

pub mod assemble;
pub mod build;
pub mod config;
pub mod config_file;
pub mod git;
pub mod manifest;
pub mod manifests_workflow;
pub mod product;
pub mod system;

pub use assemble::{Bundle, BundleRecorder};
pub use build::{BuildRecorder, BuildTarget};
pub use manifest::{BuildManifest, BundleManifest, InputManifest, Manifest};
pub use product::{product_for, Product};
