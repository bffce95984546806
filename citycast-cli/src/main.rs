//! Binary crate for the `citycast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts and configuration
//! - Human-friendly and JSON output

use citycast_core::LookupError;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citycast_cli=info,citycast_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    if let Err(err) = cmd.run().await {
        match err.downcast_ref::<LookupError>() {
            Some(lookup) => {
                tracing::debug!(error = %lookup, "lookup failed");
                eprintln!("{}", lookup.user_message());
            }
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(cli::exit_code(&err));
    }
}
