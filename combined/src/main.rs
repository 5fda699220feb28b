//! usuarios - Application entry point
//!
//! CLI front end over the user repository and the session tracker.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::{AppConfig, LoadPolicy};

use crate::cli::Cli;
use crate::commands::AppContext;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, flags take precedence
    let mut config = AppConfig::from_env();
    if let Some(path) = cli.data_file.clone() {
        config = config.with_data_file(path);
    }
    if cli.strict {
        config = config.with_load_policy(LoadPolicy::Strict);
    }

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose, &config.log_level);
    tracing::debug!(?config, "Configuration loaded");

    let result = AppContext::open(&config).and_then(|ctx| commands::execute(&ctx, cli.command));

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            if e.is_client_error() {
                tracing::debug!(code = e.code(), "Command rejected: {}", e);
            } else {
                tracing::error!(code = e.code(), error = ?e, "Command failed");
            }
            eprintln!("error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool, log_level: &str) {
    let filter = if verbose { "debug" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
