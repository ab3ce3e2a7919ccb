//! # minishell
//!
//! Console front-end for the minishell session bridge.
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary that ties together:
//! - minishell-core: configuration, errors and display lines
//! - minishell-session: the child process bridge
//!
//! User input is read on a dedicated thread and forwarded to the running
//! session one line at a time. Output lines are appended to a [`Console`]
//! as `[HH:MM:SS] text`.

pub mod app;
pub mod cli;
pub mod console;

// Re-export commonly used types
pub use app::{run, spawn_input_reader};
pub use cli::Cli;
pub use console::Console;
