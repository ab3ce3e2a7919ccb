//! Timestamped display lines handed to the presentation layer.

use chrono::{DateTime, Local};

/// Default capture-time format, `HH:MM:SS`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Origin of a display line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Text read from the child's output stream
    Output,
    /// Message produced by the front-end itself (banner, status)
    Notice,
    /// Failure reported to the user
    Error,
}

/// A filtered, timestamp-tagged unit of text ready for append-only display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    captured_at: DateTime<Local>,
    text: String,
    kind: LineKind,
}

impl DisplayLine {
    /// Create a line stamped with the current local time.
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self::at(Local::now(), kind, text)
    }

    /// Create a line with an explicit capture time.
    pub fn at(captured_at: DateTime<Local>, kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            captured_at,
            text: text.into(),
            kind,
        }
    }

    /// Line carrying child output.
    pub fn output(text: impl Into<String>) -> Self {
        Self::new(LineKind::Output, text)
    }

    /// Line carrying a front-end notice.
    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(LineKind::Notice, text)
    }

    /// Line carrying an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(LineKind::Error, text)
    }

    /// Filtered text, exactly as read (terminator included when present).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line origin.
    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Capture time.
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Render as `[<timestamp>] <text>` with a custom strftime format.
    pub fn render(&self, timestamp_format: &str) -> String {
        format!(
            "[{}] {}",
            self.captured_at.format(timestamp_format),
            self.text
        )
    }
}

impl std::fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(DEFAULT_TIMESTAMP_FORMAT))
    }
}
