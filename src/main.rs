mod cli;
mod config;
mod dispatcher;
mod error;
mod exporters;
mod holdings;
mod importers;
mod portfolio;
mod pricing;
mod signals;
mod stocks;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatcher::dispatch_command(cli).await
}
