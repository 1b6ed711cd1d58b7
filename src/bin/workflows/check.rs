use std::path::PathBuf;

use anyhow::{Context, Result};
use bundle_workflow::build::BuildTarget;
use bundle_workflow::product::product_for;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct CheckArtifactArgs {
    /// Product name (`OpenSearch`, `OpenSearch Dashboards`) or slug
    #[arg(long)]
    name: String,

    #[arg(long)]
    version: String,

    #[arg(long)]
    snapshot: bool,

    /// Artifact type (`plugins`, `maven`, ...)
    artifact_type: String,

    path: PathBuf,
}

pub(crate) fn check_artifact(args: CheckArtifactArgs) -> Result<()> {
    let product = product_for(&args.name)?;
    let target = BuildTarget::builder(product.name(), &args.version)
        .snapshot(args.snapshot)
        .build()?;

    product
        .artifact_check(&args.artifact_type, &target)
        .check(&args.path)
        .with_context(|| format!("checking {} artifact", args.artifact_type))?;

    println!("{}: ok", args.path.display());
    Ok(())
}
