//! Stroke triage CLI
//!
//! # Usage
//!
//! ```bash
//! # Evaluate a single case file
//! stroke-triage evaluate --case case.json --explain
//!
//! # Assess a subject from a record bundle as a neurologist
//! stroke-triage assess --records records.yaml --subject p-1001 --role neurologist
//!
//! # List the criteria
//! stroke-triage criteria --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Eligible, or command succeeded
//! - 1: Not eligible
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: A required record is missing
//! - 6: Role may not request an evaluation
//! - 10: Internal error

use anyhow::Context;
use clap::Parser;
use stroke_triage::{run_cli, ExitCode, LogFormat, LoggingConfig, TriageCli, TriageConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig, verbose: u8, quiet: bool) {
    let directive = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => logging.level.clone(),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn main() {
    let cli = TriageCli::parse();

    let config = match TriageConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(ExitCode::from_anyhow(&e).into());
        }
    };
    init_tracing(&config.logging, cli.verbose, cli.quiet);

    tracing::debug!(
        agent_id = stroke_triage::AGENT_ID,
        version = stroke_triage::AGENT_VERSION,
        "Starting stroke triage"
    );

    let exit_code = run_cli(cli, &config);
    std::process::exit(exit_code.into());
}
