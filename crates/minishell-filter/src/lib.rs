//! # minishell-filter
//!
//! Turns raw child output into plain display text.
//!
//! This crate provides:
//! - [`strip_escapes`], a pure function removing ANSI/VT escape sequences
//! - [`EscapeFilter`], the streaming form that keeps parser state between
//!   chunks of one output stream
//!
//! ## Architecture
//!
//! This is a leaf crate: it has no dependency on other minishell crates and
//! is driven by the session bridge for every chunk it emits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod escape;

pub use escape::{strip_escapes, EscapeFilter};
