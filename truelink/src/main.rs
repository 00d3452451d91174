//! TrueLink - terminal client for the TrueLink professional network.
//!
//! Architecture:
//! - Components (auth, profile, search, connections) each own their view state
//! - All of them share one session handle holding the bearer credential
//! - The credential is persisted to a file between runs

use anyhow::Result;
use clap::Parser;

use truelink::cli::{execute, Cli};
use truelink::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli).await
}
