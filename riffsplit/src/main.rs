mod application;
mod presentation;

use clap::Parser;
use riffsplit_core::error::Result;
use tracing_subscriber::EnvFilter;

use crate::presentation::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    application::run(cli)
}
