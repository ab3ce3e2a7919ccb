//! # minishell-session
//!
//! Session bridge between a long-lived child process and a display sink.
//!
//! This crate provides:
//! - Child launch with stdin piped and stdout/stderr merged into one pipe
//! - Serialized, flushed line writes to the child
//! - A cancellable background reader that filters and timestamps output
//! - Lifecycle tracking (`Starting → Running → Terminated`)
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on minishell-core and
//! minishell-filter, and is consumed by the front-end binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod output;
mod pipe;
pub mod session;
mod state;

// Re-export commonly used types
pub use session::{OutputReceiver, Session};
