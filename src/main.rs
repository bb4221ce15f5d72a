use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use donation_tracker::cli::{load_config, run_command, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = load_config(&cli)?;

    // Initialize logging; stdout is reserved for command output
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(
        "donation-tracker v{} using {}",
        env!("CARGO_PKG_VERSION"),
        config.api.base_url
    );

    run_command(&cli, config).await
}
