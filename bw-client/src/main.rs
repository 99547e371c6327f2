//! bw-client - Blue Waves command-line client
//!
//! Resolves configuration, sets up logging, and runs one subcommand.
//! Exits with status 2 when the session could not be authenticated.

use std::process::ExitCode;

use anyhow::{Context, Result};
use bw_client::cli::{self, Args};
use bw_client::logging;
use bw_client::ClientError;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = logging::resolve_config(&args.overrides(), std::io::stderr)
        .context("Failed to resolve configuration")?;
    logging::init_tracing(&config.logging)?;

    info!(
        api = %config.api_base_url,
        version = env!("CARGO_PKG_VERSION"),
        "Starting bw-client"
    );

    match cli::run(args, &config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<ClientError>().and_then(ClientError::redirect) {
            Some(route) => {
                eprintln!("{}. Log in again ({})", err, route);
                Ok(ExitCode::from(2))
            }
            None => Err(err),
        },
    }
}
