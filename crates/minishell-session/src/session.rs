//! Session bridge between one child process and the presentation layer.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use minishell_core::{DisplayLine, Error, Result, SessionConfig, SessionId, SessionStatus};

use crate::output::OutputReader;
use crate::pipe::{self, OutputSource};
use crate::state::SessionState;

/// Receiving end of a session's display lines, in read order.
pub type OutputReceiver = mpsc::UnboundedReceiver<DisplayLine>;

/// One long-lived child process with its input and merged output attached.
///
/// The session owns the child, both pipe ends and the reader task. Input is
/// written through [`send`](Self::send); output arrives on the receiver
/// returned by [`start`](Self::start).
///
/// # Example
///
/// ```no_run
/// use minishell_core::SessionConfig;
/// use minishell_session::Session;
///
/// # async fn example() -> minishell_core::Result<()> {
/// let mut session = Session::new(SessionConfig::new("/bin/sh"));
/// let mut output = session.start()?;
///
/// session.send("echo hi").await?;
/// if let Some(line) = output.recv().await {
///     print!("{line}");
/// }
///
/// session.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    created_at: SystemTime,
    state: Arc<SessionState>,
    stdin: tokio::sync::Mutex<Option<ChildStdin>>,
    reader: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl Session {
    /// Create a session in the `Starting` state. Nothing is spawned yet.
    pub fn new(config: SessionConfig) -> Self {
        let id = SessionId::new();
        debug!("Session created: id={}, program='{}'", id, config.program);

        Self {
            id,
            config,
            created_at: SystemTime::now(),
            state: Arc::new(SessionState::new(id)),
            stdin: tokio::sync::Mutex::new(None),
            reader: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    /// Spawn the child and begin draining its output.
    ///
    /// Must be called from within a Tokio runtime. On failure the session
    /// moves straight to `Terminated` and can't be started again.
    pub fn start(&mut self) -> Result<OutputReceiver> {
        match self.status() {
            SessionStatus::Starting => {}
            SessionStatus::Running => return Err(Error::AlreadyStarted),
            SessionStatus::Terminated => return Err(Error::SessionTerminated),
        }

        info!(
            "Starting session: id={}, program='{}', args={:?}, cwd={:?}",
            self.id, self.config.program, self.config.args, self.config.working_directory
        );

        let (mut child, source) = match self.launch() {
            Ok(launched) => launched,
            Err(source) => {
                error!(
                    "Failed to launch '{}' for session {}: {}",
                    self.config.program, self.id, source
                );
                self.state.transition(SessionStatus::Terminated);
                return Err(Error::Launch {
                    program: self.config.program.clone(),
                    source,
                });
            }
        };

        let pid = child.id();
        let stdin = child.stdin.take();
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = OutputReader::new(
            Arc::clone(&self.state),
            source,
            &self.config,
            tx,
            self.shutdown.clone(),
        );

        // Running must be recorded before the reader can observe end of stream.
        self.state.transition(SessionStatus::Running);
        *self.stdin.get_mut() = stdin;
        *self
            .reader
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = Some(tokio::spawn(reader.run(child)));

        info!("Session started: id={}, pid={:?}", self.id, pid);
        Ok(rx)
    }

    fn launch(&self) -> std::io::Result<(Child, OutputSource)> {
        let pipe = pipe::merged_pipe()?;

        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .envs(self.config.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(pipe.stdout)
            .stderr(pipe.stderr)
            .kill_on_drop(true);

        if let Some(dir) = &self.config.working_directory {
            debug!("Setting working directory to: {}", dir);
            command.current_dir(dir);
        }

        let child = command.spawn()?;
        // `command` drops here and with it the parent's write ends of the pipe.
        Ok((child, pipe.reader))
    }

    /// Write `line` plus a newline to the child's input and flush it.
    ///
    /// Concurrent callers are serialized; each line reaches the child whole.
    /// A `line` with an embedded newline is rejected.
    pub async fn send(&self, line: &str) -> Result<()> {
        match self.status() {
            SessionStatus::Running => {}
            SessionStatus::Starting => return Err(Error::NotStarted),
            SessionStatus::Terminated => return Err(Error::SessionTerminated),
        }

        if line.contains('\n') {
            return Err(Error::InvalidInput("line must not contain a newline".to_string()));
        }

        let mut payload = Vec::with_capacity(line.len() + 1);
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');

        let mut stdin = self.stdin.lock().await;
        let writer = stdin.as_mut().ok_or(Error::InputClosed)?;

        writer
            .write_all(&payload)
            .await
            .map_err(|e| self.write_failed(e))?;
        writer.flush().await.map_err(|e| self.write_failed(e))?;

        debug!("Sent {} bytes to session {}", payload.len(), self.id);
        Ok(())
    }

    fn write_failed(&self, e: std::io::Error) -> Error {
        warn!("Write to session {} failed: {}", self.id, e);
        Error::Write(e)
    }

    /// Close the child's input so it sees end of file.
    ///
    /// Output keeps flowing until the child exits on its own. Later calls to
    /// [`send`](Self::send) fail with [`Error::InputClosed`].
    pub async fn close_input(&self) {
        if self.stdin.lock().await.take().is_some() {
            debug!("Input closed: id={}", self.id);
        }
    }

    /// Stop the reader, release the child's streams and kill the child.
    ///
    /// Returns once the reader task has finished. Safe to call repeatedly.
    pub async fn close(&self) {
        let first_close = !self.shutdown.is_cancelled();
        self.shutdown.cancel();

        drop(self.stdin.lock().await.take());

        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = reader {
            if let Err(e) = handle.await {
                warn!("Reader task of session {} ended abnormally: {}", self.id, e);
            }
        }

        self.state.transition(SessionStatus::Terminated);
        if first_close {
            info!("Session closed: id={}", self.id);
        }
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the launch configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the session creation time.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Get the current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Check if the child is running with its streams attached.
    pub fn is_alive(&self) -> bool {
        self.status() == SessionStatus::Running
    }

    /// Exit code of the child once it has been reaped.
    ///
    /// `None` while running, after a kill by signal, or if the child could
    /// not be reaped.
    pub fn exit_code(&self) -> Option<i32> {
        self.state.exit_code()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The reader drops the child handle on exit, which kills it.
        self.shutdown.cancel();
    }
}
