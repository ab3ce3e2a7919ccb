//! Append-only scrollback on a byte sink.

use std::io::{self, Write};

use minishell_core::DisplayLine;

/// Scrollback that renders each [`DisplayLine`] as `[timestamp] text`.
///
/// Lines are written and flushed one at a time, so whatever the sink is
/// shows them in arrival order.
#[derive(Debug)]
pub struct Console<W: Write> {
    out: W,
    timestamp_format: String,
}

impl<W: Write> Console<W> {
    /// Create a console writing to `out`.
    pub fn new(out: W, timestamp_format: impl Into<String>) -> Self {
        Self {
            out,
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Append one line to the end of the scrollback.
    pub fn append(&mut self, line: &DisplayLine) -> io::Result<()> {
        let rendered = line.render(&self.timestamp_format);
        self.out.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    /// Consume the console and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
