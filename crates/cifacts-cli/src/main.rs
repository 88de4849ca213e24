//! `cifacts`: print the PR, repository, and commit metadata of the
//! current build, resolved from CI environment variables with git
//! fallback.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cifacts_core::{GitClient, MetadataResolver, ProcessEnv};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::get::Fact;

#[derive(Parser, Debug)]
#[command(
    name = "cifacts",
    version,
    about = "Resolve PR, repository, and commit metadata from CI environment variables with git fallback"
)]
struct Cli {
    /// Repository directory used for git fallbacks.
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every fact that resolves.
    Show,
    /// Print a single fact; exits non-zero when it cannot be resolved.
    Get { fact: Fact },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolver = MetadataResolver::new(ProcessEnv, GitClient::new(&cli.repo));

    match cli.command {
        Commands::Show => commands::show::run(&resolver, cli.json),
        Commands::Get { fact } => commands::get::run(&resolver, fact, cli.json),
    }
}
