//! Persona - Main Entry Point
//!
//! Trains the personality classifier and runs the interactive questionnaire.

use clap::Parser;
use persona_svm::cli::{cmd_interactive, cmd_report, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "persona=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    match cli.command {
        Some(Commands::Report { json }) => cmd_report(&config, json)?,
        None => cmd_interactive(&config)?,
    }

    Ok(())
}
