#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from bad input.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripleql::cli::{Cli, execute};
use tripleql::config::GraphConfig;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripleql=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration from environment variables
    let config = match GraphConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: endpoint={}, user={}, database={}",
        config.endpoint,
        config.user,
        config.database.as_deref().unwrap_or("-")
    );

    match execute(&cli, &config) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
