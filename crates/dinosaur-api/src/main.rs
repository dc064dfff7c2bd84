//! Dinosaur API server
//!
//! Starts the HTTP server for dinosaur records.

use anyhow::Context;
use clap::Parser;
use dinosaur_api::cli::{load_env_file, Cli};
use dinosaur_api::{init_tracing, start_server};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Before parsing so .env values feed the env-backed flags
    load_env_file(None).context("failed to read .env")?;

    let cli = Cli::parse();
    let config = cli.load_config().context("invalid configuration")?;

    init_tracing(&config.log_level);

    start_server(config).await.context("server stopped")?;

    Ok(())
}
