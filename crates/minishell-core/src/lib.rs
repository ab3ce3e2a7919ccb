//! # minishell-core
//!
//! Core types for minishell.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other minishell crates. It provides:
//!
//! - Session types (SessionId, SessionStatus, SessionConfig)
//! - Display lines handed to the presentation layer
//! - Application configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other minishell crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod line;
pub mod session;

// Re-export commonly used types
pub use config::{AppConfig, DisplaySettings, ShellSettings};
pub use error::{Error, Result};
pub use line::{DisplayLine, LineKind, DEFAULT_TIMESTAMP_FORMAT};
pub use session::{ReadMode, SessionConfig, SessionId, SessionStatus};
