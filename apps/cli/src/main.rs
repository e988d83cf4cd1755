//! Quickstart CLI: turn a tool's web page into runnable Docker bootstrap scripts.
//!
//! Fetches a URL, asks a content extractor which tool the page describes, and
//! prints a Bash script and a Docker Compose snippet for running it.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
