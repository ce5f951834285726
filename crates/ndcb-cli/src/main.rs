//! ndcb entry point.
//!
//! ```bash
//! ndcb files
//! ndcb resolve /blog/hello/
//! RUST_LOG=ndcb_fs=debug ndcb not-found /blog/missing
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ndcb_cli::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output; logs go to stderr (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    ndcb_cli::run(cli, &mut stdout).await
}
