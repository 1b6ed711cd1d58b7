use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod workflows;

#[derive(Parser, Debug)]
#[command(
    name = "bundle-workflow",
    version,
    about = "Record component builds and assemble OpenSearch distribution bundles"
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a bundle from a build manifest and its artifacts
    Assemble(workflows::AssembleArgs),
    /// Run the artifact validator for one file
    CheckArtifact(workflows::CheckArtifactArgs),
    /// Parse and schema-check a manifest
    Validate(workflows::ValidateArgs),
    /// List the input manifests of a product
    Manifests(workflows::ManifestsArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Assemble(args) => {
            let packaged = workflows::assemble(args)?;
            println!("{}", packaged.display());
            Ok(())
        }
        Command::CheckArtifact(args) => workflows::check_artifact(args),
        Command::Validate(args) => workflows::validate(args),
        Command::Manifests(args) => {
            let files: Vec<PathBuf> = workflows::list_manifests(args)?;
            for file in files {
                println!("{}", file.display());
            }
            Ok(())
        }
    }
}
