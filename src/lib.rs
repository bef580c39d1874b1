pub mod commands;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod review; // Manual review entry
pub mod session; // In-memory review session

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run() {
    // Initialize tracing (stderr, so stdout stays pure review text)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = commands::Cli::parse();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match commands::execute(cli.command) {
        Ok(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
