//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use minishell_core::{AppConfig, ReadMode};

/// Talk to a long-lived child shell with timestamped output
#[derive(Parser, Debug)]
#[command(name = "minishell")]
#[command(about = "Console bridge to a persistent child shell", long_about = None)]
#[command(version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "PATH", env = "MINISHELL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Deliver output as soon as it is read instead of waiting for newlines
    #[arg(long)]
    pub chunked: bool,

    /// Program to launch instead of the configured shell
    #[arg(value_name = "PROGRAM")]
    pub program: Option<String>,

    /// Arguments passed to PROGRAM
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        requires = "program"
    )]
    pub args: Vec<String>,
}

impl Cli {
    /// Apply command line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        if self.chunked {
            config.shell.read_mode = ReadMode::Chunk;
        }

        if let Some(program) = &self.program {
            config.shell.program = program.clone();
            config.shell.args = self.args.clone();
        }
    }
}
