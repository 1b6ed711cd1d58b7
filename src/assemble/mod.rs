//! Bundle assembly.
//!
//! - [`bundle`] - extract the min tarball, install plugins, package
//! - [`recorder`] - bundle manifest and public/local locations
//! - [`scripts`] - optional per-component install scripts
//! - [`archive`] - tar.gz handling and checksums

pub mod archive;
pub mod bundle;
pub mod recorder;
pub mod scripts;

pub use bundle::{AssemblyState, Bundle, PackagedBundle};
pub use recorder::{BundleRecorder, PLATFORM};
pub use scripts::ScriptFinder;
