//! # minishell
//!
//! Console front-end for a persistent child shell.
//!
//! Lines typed on standard input go to the shell; everything the shell
//! prints on stdout or stderr comes back with escape sequences removed and a
//! `[HH:MM:SS]` prefix.

use clap::Parser;
use minishell::{run, spawn_input_reader, Cli, Console};
use minishell_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    cli.apply_to(&mut config);
    config.validate()?;

    // Logs go to stderr so they never mix with the scrollback
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "minishell v{} starting: program='{}'",
        env!("CARGO_PKG_VERSION"),
        config.shell.program
    );

    let commands = spawn_input_reader();
    let mut console = Console::new(std::io::stdout(), config.display.timestamp_format.clone());

    run(&config, commands, &mut console).await.map_err(|e| {
        tracing::error!("Session ended with error: {:#}", e);
        e
    })?;

    tracing::info!("minishell shutting down");

    Ok(())
}
