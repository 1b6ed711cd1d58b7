use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bundle_workflow::assemble::{Bundle, BundleRecorder, ScriptFinder};
use bundle_workflow::config::{WorkflowConfig, CONFIG_FILENAME, PUBLIC_URL_VAR};
use bundle_workflow::manifest::{BuildManifest, Manifest};
use bundle_workflow::system::ShellRunner;
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct AssembleArgs {
    /// Build manifest; its directory is the artifacts directory
    manifest: PathBuf,

    /// Where the bundle is written (default: ./bundle)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Public base URL for manifest locations
    #[arg(long, env = PUBLIC_URL_VAR)]
    base_url: Option<String>,

    /// Root of the component install scripts (default: ./scripts)
    #[arg(long)]
    scripts: Option<PathBuf>,

    /// Workflow config file
    #[arg(long, default_value = CONFIG_FILENAME)]
    config: PathBuf,
}

/// Returns the path of the packaged bundle.
pub(crate) fn assemble(args: AssembleArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("resolving current directory")?;
    let config = WorkflowConfig::load(&args.config)?;

    let manifest_path = absolute(&cwd, &args.manifest);
    let manifest = BuildManifest::from_path(&manifest_path)
        .with_context(|| format!("loading build manifest '{}'", manifest_path.display()))?;
    let artifacts_dir = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd.clone());

    let output_dir = args
        .output
        .map(|dir| absolute(&cwd, &dir))
        .or(config.output_dir)
        .unwrap_or_else(|| cwd.join("bundle"));
    let scripts_dir = args
        .scripts
        .map(|dir| absolute(&cwd, &dir))
        .or(config.scripts_dir)
        .unwrap_or_else(|| cwd.join("scripts"));
    let public_url = args.base_url.or(config.public_url);

    info!(
        name = %manifest.build.name,
        version = %manifest.build.version,
        artifacts = %artifacts_dir.display(),
        output = %output_dir.display(),
        "assembling bundle"
    );

    let recorder = BundleRecorder::new(&manifest.build, &output_dir, &artifacts_dir, public_url);
    let mut bundle = Bundle::create(
        manifest,
        &artifacts_dir,
        recorder,
        Box::new(ShellRunner),
        ScriptFinder::new(scripts_dir),
    )?;
    bundle.install_plugins()?;
    let packaged = bundle.package(&output_dir)?;
    bundle.write_manifest(&output_dir)?;

    Ok(packaged.tarball)
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
