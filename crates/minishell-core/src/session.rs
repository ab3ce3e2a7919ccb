//! Session types for the child process bridge.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of bytes requested per read in chunk mode.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a session.
///
/// Transitions only move forward: `Starting → Running → Terminated`, or
/// `Starting → Terminated` when the launch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Created, child not spawned yet
    Starting,
    /// Child is running with its streams attached
    Running,
    /// Child exited, launch failed, or the session was closed
    Terminated,
}

impl SessionStatus {
    /// Whether the session has reached its terminal state.
    pub fn is_terminated(self) -> bool {
        self == SessionStatus::Terminated
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::Starting => "starting",
            SessionStatus::Running => "running",
            SessionStatus::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// How the reader loop slices the child's output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// One read per line, terminator included
    #[default]
    Line,
    /// Whatever is available, up to `chunk_size` bytes
    Chunk,
}

/// Configuration for launching the child process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Program to execute (e.g., "/bin/sh", "wsl")
    pub program: String,
    /// Program arguments
    pub args: Vec<String>,
    /// Working directory for the child
    pub working_directory: Option<String>,
    /// Environment variables added to the inherited environment
    pub env: Vec<(String, String)>,
    /// Read slicing
    pub read_mode: ReadMode,
    /// Maximum bytes per read in chunk mode
    pub chunk_size: usize,
    /// Translate `\r\n` and lone `\r` to `\n`
    pub universal_newlines: bool,
}

impl SessionConfig {
    /// Create a configuration for `program` with default settings.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Set program arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the read mode.
    pub fn with_read_mode(mut self, read_mode: ReadMode) -> Self {
        self.read_mode = read_mode;
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: Vec::new(),
            working_directory: None,
            env: Vec::new(),
            read_mode: ReadMode::Line,
            chunk_size: DEFAULT_CHUNK_SIZE,
            universal_newlines: true,
        }
    }
}

/// Shell launched when nothing else is configured.
pub fn default_program() -> String {
    if cfg!(windows) {
        "cmd.exe".to_string()
    } else {
        "/bin/sh".to_string()
    }
}
