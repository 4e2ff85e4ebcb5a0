//! dirwatch CLI - dirwatch command

use anyhow::Result;
use clap::Parser;
use cli_lib::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    cli_lib::run(cli)
}
