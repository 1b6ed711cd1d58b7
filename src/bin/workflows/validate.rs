use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bundle_workflow::manifest::{BuildManifest, BundleManifest, InputManifest, Manifest};
use clap::{Args, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Kind {
    Input,
    Build,
    Bundle,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    #[arg(value_enum)]
    kind: Kind,

    path: PathBuf,
}

pub(crate) fn validate(args: ValidateArgs) -> Result<()> {
    let summary = match args.kind {
        Kind::Input => {
            let manifest = load::<InputManifest>(&args.path)?;
            summarize(&manifest.build.name, &manifest.build.version, manifest.components.len())
        }
        Kind::Build => {
            let manifest = load::<BuildManifest>(&args.path)?;
            summarize(
                &manifest.build.name,
                &manifest.build.version,
                manifest.iter_components().count(),
            )
        }
        Kind::Bundle => {
            let manifest = load::<BundleManifest>(&args.path)?;
            summarize(
                &manifest.build.name,
                &manifest.build.version,
                manifest.iter_components().count(),
            )
        }
    };
    println!("{}: {summary}", args.path.display());
    Ok(())
}

fn load<M: Manifest>(path: &Path) -> Result<M> {
    M::from_path(path).with_context(|| format!("validating '{}'", path.display()))
}

fn summarize(name: &str, version: &str, components: usize) -> String {
    format!("{name} {version}, {components} component(s)")
}
