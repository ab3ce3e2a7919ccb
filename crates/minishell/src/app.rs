//! Console run loop.

use std::io::{BufRead, Write};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use minishell_core::{AppConfig, DisplayLine};
use minishell_session::Session;

use crate::console::Console;

/// Read lines from the process's standard input on a dedicated thread.
///
/// The channel closes when standard input reaches end of file or fails.
pub fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read user input: {}", e);
                    break;
                }
            }
        }
        debug!("User input closed");
    });

    rx
}

/// Run one session until the child exits, input is exhausted and drained, or
/// Ctrl-C is pressed.
///
/// Each entry of `commands` is trimmed and forwarded to the child; blank
/// entries are skipped. When `commands` closes, the child's input is closed
/// and the loop keeps draining output until the child exits.
pub async fn run<W: Write>(
    config: &AppConfig,
    mut commands: mpsc::UnboundedReceiver<String>,
    console: &mut Console<W>,
) -> anyhow::Result<()> {
    if let Some(banner) = &config.display.banner {
        console.append(&DisplayLine::notice(banner.as_str()))?;
    }

    let mut session = Session::new(config.session_config());
    let mut output = match session.start() {
        Ok(output) => output,
        Err(e) => {
            console.append(&DisplayLine::error(e.to_string()))?;
            return Err(e).context("could not start the shell");
        }
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut input_open = true;

    loop {
        tokio::select! {
            line = output.recv() => match line {
                Some(line) => console.append(&line)?,
                None => {
                    info!(
                        "Shell exited: id={}, code={:?}",
                        session.id(),
                        session.exit_code()
                    );
                    break;
                }
            },
            command = commands.recv(), if input_open => match command {
                Some(command) => {
                    let command = command.trim();
                    if command.is_empty() {
                        continue;
                    }
                    if let Err(e) = session.send(command).await {
                        if e.is_fatal() {
                            // Output read before the child went away is still queued.
                            while let Some(line) = output.recv().await {
                                console.append(&line)?;
                            }
                            console.append(&DisplayLine::error(e.to_string()))?;
                            break;
                        }
                        console.append(&DisplayLine::error(e.to_string()))?;
                    }
                }
                None => {
                    debug!("Input exhausted, closing shell input");
                    session.close_input().await;
                    input_open = false;
                }
            },
            _ = &mut ctrl_c => {
                info!("Interrupted, closing session {}", session.id());
                break;
            }
        }
    }

    session.close().await;
    Ok(())
}

