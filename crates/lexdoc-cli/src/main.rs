//! # lexdoc CLI Entry Point
//!
//! Parses arguments and dispatches to the command modules.

use std::process::ExitCode;

use clap::Parser;

/// Document lifecycle operator toolkit.
#[derive(Parser, Debug)]
#[command(name = "lexdoc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signer key pair.
    Keygen(lexdoc_cli::keys::KeygenArgs),
    /// Print or check the SHA-256 digest of a file.
    Digest(lexdoc_cli::digest::DigestArgs),
    /// Verify an exported signature record.
    VerifySignature(lexdoc_cli::keys::VerifyArgs),
    /// Validate a service configuration file.
    CheckConfig(lexdoc_cli::config::CheckConfigArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed arguments");

    let code = match &cli.command {
        Commands::Keygen(args) => lexdoc_cli::keys::run_keygen(args)?,
        Commands::Digest(args) => lexdoc_cli::digest::run_digest(args)?,
        Commands::VerifySignature(args) => lexdoc_cli::keys::run_verify(args)?,
        Commands::CheckConfig(args) => lexdoc_cli::config::run_check_config(args)?,
    };
    Ok(ExitCode::from(code))
}
