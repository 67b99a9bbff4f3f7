//! repo-scaffold - source generators for entity repositories

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod generator;
mod naming;
mod templates;

use cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.run() {
        Ok(path) => {
            tracing::info!(path = %path.display(), "Generated file");
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
