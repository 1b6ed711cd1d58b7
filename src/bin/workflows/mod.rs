mod assemble;
mod check;
mod manifests;
mod validate;

pub(crate) use assemble::{assemble, AssembleArgs};
pub(crate) use check::{check_artifact, CheckArtifactArgs};
pub(crate) use manifests::{list_manifests, ManifestsArgs};
pub(crate) use validate::{validate, ValidateArgs};
