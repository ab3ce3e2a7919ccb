//! ANSI/VT escape sequence removal using the VTE crate.
//!
//! The VTE state machine recognises every escape form a terminal program is
//! likely to emit (CSI, OSC, DCS and the SOS/PM/APC strings, plus two-byte
//! `ESC x` sequences). Only printable characters and plain C0 controls reach
//! the output; everything consumed by a sequence is dropped.

use vte::Perform;

/// UTF-8 encoding of U+FFFD, fed to the parser in place of invalid bytes.
const REPLACEMENT: &[u8] = "\u{fffd}".as_bytes();

/// Remove all escape sequences from `text`.
///
/// Stateless: a sequence left incomplete at the end of `text` is dropped.
/// Bytes that look like escape syntax but lack the ESC introducer (`"[31m"`)
/// are kept as they are.
///
/// # Example
///
/// ```
/// use minishell_filter::strip_escapes;
///
/// assert_eq!(strip_escapes("\x1b[1;32mok\x1b[0m\n"), "ok\n");
/// assert_eq!(strip_escapes("[31m"), "[31m");
/// ```
pub fn strip_escapes(text: &str) -> String {
    let mut filter = EscapeFilter::new();
    let mut out = filter.feed(text.as_bytes());
    out.push_str(&filter.finish());
    out
}

/// Streaming escape filter for one output stream.
///
/// Parser state survives between [`feed`](Self::feed) calls, so a sequence
/// or a UTF-8 code point split across two reads is still handled. Invalid
/// UTF-8 is replaced with U+FFFD.
pub struct EscapeFilter {
    parser: vte::Parser,
    sink: TextSink,
    /// Leading bytes of a code point cut off at the end of the last chunk
    partial: Vec<u8>,
}

impl std::fmt::Debug for EscapeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscapeFilter")
            .field("universal_newlines", &self.sink.universal_newlines)
            .field("pending_cr", &self.sink.pending_cr)
            .field("partial", &self.partial)
            .finish_non_exhaustive()
    }
}

impl EscapeFilter {
    /// Create a filter that leaves line endings untouched.
    pub fn new() -> Self {
        Self {
            parser: vte::Parser::new(),
            sink: TextSink::default(),
            partial: Vec::new(),
        }
    }

    /// Translate `\r\n` and lone `\r` into `\n`, like a text-mode stream.
    ///
    /// A trailing `\r` is held back until the next byte (or [`finish`](Self::finish))
    /// shows whether it starts a `\r\n` pair.
    pub fn with_universal_newlines(mut self, enabled: bool) -> Self {
        self.sink.universal_newlines = enabled;
        self
    }

    /// Feed raw bytes and return the display text they produced.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.partial);
        input.extend_from_slice(bytes);

        // The parser only ever sees valid UTF-8; vte drops invalid bytes.
        let mut rest = input.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.advance(valid.as_bytes());
                    break;
                }
                Err(e) => {
                    let (valid, invalid) = rest.split_at(e.valid_up_to());
                    self.advance(valid);
                    match e.error_len() {
                        Some(len) => {
                            self.advance(REPLACEMENT);
                            rest = &invalid[len..];
                        }
                        None => {
                            self.partial.extend_from_slice(invalid);
                            break;
                        }
                    }
                }
            }
        }

        std::mem::take(&mut self.sink.out)
    }

    fn advance(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.parser.advance(&mut self.sink, *byte);
        }
    }

    /// Flush held-back state at end of stream and reset the parser.
    ///
    /// A code point still incomplete at this point becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if !self.partial.is_empty() {
            self.partial.clear();
            self.advance(REPLACEMENT);
        }
        if self.sink.pending_cr {
            self.sink.pending_cr = false;
            self.sink.out.push('\n');
        }
        self.parser = vte::Parser::new();
        std::mem::take(&mut self.sink.out)
    }
}

impl Default for EscapeFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct TextSink {
    out: String,
    universal_newlines: bool,
    pending_cr: bool,
}

impl TextSink {
    fn push(&mut self, c: char) {
        if !self.universal_newlines {
            self.out.push(c);
            return;
        }

        if self.pending_cr {
            self.pending_cr = false;
            self.out.push('\n');
            if c == '\n' {
                return;
            }
        }

        if c == '\r' {
            self.pending_cr = true;
        } else {
            self.out.push(c);
        }
    }
}

impl Perform for TextSink {
    fn print(&mut self, c: char) {
        self.push(c);
    }

    // C0 controls (newline, tab, bell, ...) are text, not escape sequences.
    fn execute(&mut self, byte: u8) {
        self.push(char::from(byte));
    }
}
