//! Merged stdout/stderr pipe for the child process.
//!
//! Both output streams of the child write into the same anonymous pipe, so
//! the reader sees them interleaved exactly as the child produced them.

use std::io;
use std::process::Stdio;

use tokio::io::AsyncRead;

/// Read end of the child's merged output stream.
pub(crate) type OutputSource = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// One pipe, two write ends handed to the child.
pub(crate) struct MergedPipe {
    /// Async read end, owned by the reader loop
    pub reader: OutputSource,
    /// Write end for the child's stdout
    pub stdout: Stdio,
    /// Second write end for the child's stderr
    pub stderr: Stdio,
}

/// Create the merged output pipe.
///
/// Must be called from within a Tokio runtime. The returned [`Stdio`] values
/// have to be dropped on the parent side once the child is spawned, otherwise
/// the reader never sees end of stream.
pub(crate) fn merged_pipe() -> io::Result<MergedPipe> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;

    Ok(MergedPipe {
        reader: into_async(reader)?,
        stdout: Stdio::from(writer),
        stderr: Stdio::from(stderr),
    })
}

#[cfg(unix)]
fn into_async(reader: io::PipeReader) -> io::Result<OutputSource> {
    use std::os::fd::OwnedFd;

    // Switches the descriptor to non-blocking and registers it with the reactor.
    let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
    Ok(Box::new(receiver))
}

#[cfg(windows)]
fn into_async(reader: io::PipeReader) -> io::Result<OutputSource> {
    use std::os::windows::io::OwnedHandle;

    // Anonymous pipes cannot be registered with IOCP; reads run on the blocking pool.
    let file = std::fs::File::from(OwnedHandle::from(reader));
    Ok(Box::new(tokio::fs::File::from_std(file)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_merged_pipe_reads_until_writers_close() {
        let (reader, mut writer) = io::pipe().unwrap();
        let mut source = into_async(reader).unwrap();

        writer.write_all(b"from stdout\n").unwrap();
        let mut clone = writer.try_clone().unwrap();
        clone.write_all(b"from stderr\n").unwrap();
        drop(writer);
        drop(clone);

        let mut out = String::new();
        source.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "from stdout\nfrom stderr\n");
    }

    #[tokio::test]
    async fn test_merged_pipe_creation() {
        let pipe = merged_pipe();
        assert!(pipe.is_ok());
    }
}
