use anyhow::Result;
use blink_cli::commands::attest::{self, SignArgs, VerifyArgs};
use blink_cli::commands::watch::{self, WatchArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Timestamped, signed file hashes.
#[derive(Parser, Debug)]
#[command(name = "blink", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the content digest and a freshly timestamped hash of a file.
    Hash {
        /// File to hash.
        path: PathBuf,
    },
    /// Sign a timestamped hash of a file.
    Sign(SignArgs),
    /// Check a signed hash against a file or digest.
    Verify(VerifyArgs),
    /// Re-hash files periodically and report drift.
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Hash { path } => attest::cmd_hash(path),
        Commands::Sign(args) => attest::cmd_sign(args),
        Commands::Verify(args) => attest::cmd_verify(args).map(|_| ()),
        Commands::Watch(args) => watch::cmd_watch(args).await,
    }
}
