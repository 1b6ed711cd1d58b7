//! Recording what one build run produced.
//!
//! - [`target`] - identity of the run (product, version, arch, snapshot, build id)
//! - [`check`] - artifact validators applied before an artifact is accepted
//! - [`recorder`] - accumulates the build manifest and copies validated artifacts

pub mod check;
pub mod recorder;
pub mod target;

pub use check::{ArtifactCheck, ArtifactInvalidError, InvalidReason, NoopCheck};
pub use recorder::BuildRecorder;
pub use target::{build_id_env_var, resolve_build_id, BuildTarget, DEFAULT_OUTPUT_DIR};
