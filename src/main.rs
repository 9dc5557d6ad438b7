use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use locsynth_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    locsynth_cli::run(cli).await
}
