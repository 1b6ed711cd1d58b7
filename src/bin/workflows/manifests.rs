use std::path::PathBuf;

use anyhow::Result;
use bundle_workflow::manifests_workflow::InputManifests;
use bundle_workflow::product::product_for;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct ManifestsArgs {
    /// Manifests root, laid out as `<version>/<slug>-<version>.yml`
    #[arg(long, default_value = "manifests")]
    root: PathBuf,

    /// Product name or slug
    #[arg(long, default_value = "opensearch")]
    product: String,
}

pub(crate) fn list_manifests(args: ManifestsArgs) -> Result<Vec<PathBuf>> {
    let product = product_for(&args.product)?;
    InputManifests::new(args.root, product).files()
}
