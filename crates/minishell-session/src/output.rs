//! Background reader loop draining the child's merged output.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use minishell_core::{DisplayLine, Error, ReadMode, SessionConfig, SessionStatus};
use minishell_filter::EscapeFilter;

use crate::pipe::OutputSource;
use crate::state::SessionState;

/// How long a child gets to exit once its output has ended.
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Why the reader loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderExit {
    /// Clean end of stream, the child closed its output
    EndOfStream,
    /// Unexpected read failure
    Failed,
    /// Cancelled by `Session::close` or drop
    Closed,
}

/// Sole reader of one session's output stream.
///
/// Every read is filtered, stamped and forwarded before the next read
/// starts, so lines reach the sink in read order.
pub(crate) struct OutputReader {
    state: Arc<SessionState>,
    source: BufReader<OutputSource>,
    filter: EscapeFilter,
    read_mode: ReadMode,
    chunk_size: usize,
    sink: mpsc::UnboundedSender<DisplayLine>,
    sink_open: bool,
    shutdown: CancellationToken,
}

impl OutputReader {
    pub(crate) fn new(
        state: Arc<SessionState>,
        source: OutputSource,
        config: &SessionConfig,
        sink: mpsc::UnboundedSender<DisplayLine>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            state,
            source: BufReader::with_capacity(config.chunk_size, source),
            filter: EscapeFilter::new().with_universal_newlines(config.universal_newlines),
            read_mode: config.read_mode,
            chunk_size: config.chunk_size,
            sink,
            sink_open: true,
            shutdown,
        }
    }

    /// Drain output until end of stream, a read error, or cancellation,
    /// then mark the session terminated and reap the child.
    pub(crate) async fn run(mut self, child: Child) {
        let id = self.state.id();
        debug!("Reader loop started: id={}, mode={:?}", id, self.read_mode);

        let exit = loop {
            let read = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break ReaderExit::Closed,
                read = read_next(&mut self.source, self.read_mode, self.chunk_size) => read,
            };

            match read {
                Ok(Some(bytes)) => {
                    debug!("Read {} bytes from session {}", bytes.len(), id);
                    let text = self.filter.feed(&bytes);
                    self.forward(DisplayLine::output(text));
                }
                Ok(None) => break ReaderExit::EndOfStream,
                Err(e) => {
                    error!("Reading output of session {} failed: {}", id, e);
                    self.forward(DisplayLine::error(format!("{}\n", Error::Read(e))));
                    break ReaderExit::Failed;
                }
            }
        };

        let tail = self.filter.finish();
        self.forward(DisplayLine::output(tail));

        self.state.transition(SessionStatus::Terminated);
        reap(&self.state, child, exit).await;
        debug!("Reader loop exited: id={}, reason={:?}", id, exit);
    }

    fn forward(&mut self, line: DisplayLine) {
        if line.text().is_empty() || !self.sink_open {
            return;
        }
        if self.sink.send(line).is_err() {
            // Keep draining so the child never blocks on a full pipe.
            self.sink_open = false;
            debug!(
                "Output receiver dropped for session {}, discarding further output",
                self.state.id()
            );
        }
    }
}

/// Wait for the child to exit, killing it first unless its output ended
/// cleanly, and record its exit code.
async fn reap(state: &SessionState, mut child: Child, exit: ReaderExit) {
    let id = state.id();

    if exit != ReaderExit::EndOfStream {
        if let Err(e) = child.start_kill() {
            debug!("Kill of session {} child skipped: {}", id, e);
        }
    }

    match tokio::time::timeout(REAP_TIMEOUT, child.wait()).await {
        Ok(Ok(status)) => {
            info!("Child exited: id={}, status={}", id, status);
            state.set_exit_code(status.code());
        }
        Ok(Err(e)) => warn!("Failed to wait for child of session {}: {}", id, e),
        Err(_) => {
            warn!(
                "Child of session {} still running {:?} after its output closed, killing it",
                id, REAP_TIMEOUT
            );
            if let Err(e) = child.kill().await {
                error!("Failed to kill child of session {}: {}", id, e);
            }
        }
    }
}

/// One read against the output stream; `None` means end of stream.
async fn read_next(
    source: &mut BufReader<OutputSource>,
    mode: ReadMode,
    chunk_size: usize,
) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let n = match mode {
        ReadMode::Line => source.read_until(b'\n', &mut buf).await?,
        ReadMode::Chunk => {
            buf.resize(chunk_size, 0);
            let n = source.read(&mut buf).await?;
            buf.truncate(n);
            n
        }
    };

    Ok((n > 0).then_some(buf))
}
