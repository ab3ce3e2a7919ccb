//! Integration tests driving real child processes through the session bridge.

#![cfg(unix)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use minishell_core::{DisplayLine, Error, LineKind, ReadMode, SessionConfig, SessionStatus};
use minishell_session::{OutputReceiver, Session};

const TIMEOUT: Duration = Duration::from_secs(5);

fn sh(script: &str) -> SessionConfig {
    SessionConfig::new("/bin/sh").with_args(["-c", script])
}

async fn next_line(output: &mut OutputReceiver) -> Option<DisplayLine> {
    tokio::time::timeout(TIMEOUT, output.recv())
        .await
        .expect("timed out waiting for output")
}

/// Collect every line until the stream ends.
async fn drain(output: &mut OutputReceiver) -> Vec<DisplayLine> {
    let mut lines = Vec::new();
    while let Some(line) = next_line(output).await {
        lines.push(line);
    }
    lines
}

fn texts(lines: &[DisplayLine]) -> Vec<&str> {
    lines.iter().map(DisplayLine::text).collect()
}

#[tokio::test]
async fn test_echo_round_trip() {
    let mut session = Session::new(SessionConfig::new("/bin/sh"));
    let mut output = session.start().unwrap();
    assert_eq!(session.status(), SessionStatus::Running);

    session.send("echo hi").await.unwrap();

    let line = next_line(&mut output).await.unwrap();
    assert_eq!(line.text(), "hi\n");
    assert_eq!(line.kind(), LineKind::Output);

    let rendered = line.to_string();
    assert_eq!(&rendered[0..1], "[");
    assert_eq!(&rendered[9..11], "] ");
    assert!(NaiveTime::parse_from_str(&rendered[1..9], "%H:%M:%S").is_ok());
    assert!(rendered.ends_with("] hi\n"));

    session.close().await;
}

#[tokio::test]
async fn test_nonexistent_program_never_runs() {
    let mut session = Session::new(SessionConfig::new("/no/such/dir/shell"));
    let result = session.start();

    assert!(matches!(result, Err(Error::Launch { .. })));
    assert_eq!(session.status(), SessionStatus::Terminated);
    assert!(!session.is_alive());
}

#[tokio::test]
async fn test_start_twice() {
    let mut session = Session::new(SessionConfig::new("/bin/sh"));
    let _output = session.start().unwrap();
    assert!(matches!(session.start(), Err(Error::AlreadyStarted)));
    session.close().await;
}

#[tokio::test]
async fn test_child_exit_terminates_without_close() {
    let mut session = Session::new(SessionConfig::new("/bin/sh"));
    let mut output = session.start().unwrap();

    session.send("echo bye").await.unwrap();
    session.send("exit 3").await.unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["bye\n"]);
    assert_eq!(session.status(), SessionStatus::Terminated);

    // The exit code is recorded right after the stream ends.
    for _ in 0..50 {
        if session.exit_code().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(session.exit_code(), Some(3));
}

#[tokio::test]
async fn test_send_after_termination_fails_fast() {
    let mut session = Session::new(sh("exit 0"));
    let mut output = session.start().unwrap();

    assert!(drain(&mut output).await.is_empty());
    assert_eq!(session.status(), SessionStatus::Terminated);

    let result = session.send("echo late").await;
    assert!(matches!(result, Err(Error::SessionTerminated)));
}

#[tokio::test]
async fn test_close_unblocks_pending_read() {
    // `sleep` never reads input and never writes output.
    let mut session = Session::new(SessionConfig::new("sleep").with_args(["30"]));
    let mut output = session.start().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.is_alive());

    tokio::time::timeout(Duration::from_secs(2), session.close())
        .await
        .expect("close did not return promptly");

    assert_eq!(session.status(), SessionStatus::Terminated);
    assert!(next_line(&mut output).await.is_none());
}

#[tokio::test]
async fn test_send_rejects_embedded_newline() {
    let mut session = Session::new(SessionConfig::new("cat"));
    let mut output = session.start().unwrap();

    let result = session.send("echo a\necho b").await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    session.send("still usable").await.unwrap();
    let line = next_line(&mut output).await.unwrap();
    assert_eq!(line.text(), "still usable\n");

    session.close().await;
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut session = Session::new(SessionConfig::new("/bin/sh"));
    let _output = session.start().unwrap();

    session.close().await;
    session.close().await;
    assert_eq!(session.status(), SessionStatus::Terminated);
    assert!(matches!(
        session.send("echo hi").await,
        Err(Error::SessionTerminated)
    ));
}

#[tokio::test]
async fn test_lines_arrive_in_read_order() {
    let mut session = Session::new(sh(
        "i=1; while [ $i -le 50 ]; do echo line$i; i=$((i+1)); done",
    ));
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    let expected: Vec<String> = (1..=50).map(|i| format!("line{i}\n")).collect();
    assert_eq!(texts(&lines), expected);
}

#[tokio::test]
async fn test_stderr_is_merged() {
    let mut session = Session::new(sh("echo out; echo err 1>&2; echo out2"));
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["out\n", "err\n", "out2\n"]);
}

#[tokio::test]
async fn test_escape_sequences_are_filtered() {
    let mut session = Session::new(sh(r"printf '\033[31mred\033[0m\r\n\033]0;title\007plain\n'"));
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["red\n", "plain\n"]);
}

#[tokio::test]
async fn test_output_only_escapes_is_not_forwarded() {
    let mut session = Session::new(sh(r"printf '\033[?2004h'; echo done"));
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["done\n"]);
}

#[tokio::test]
async fn test_trailing_partial_line_is_flushed() {
    let mut session = Session::new(sh("printf 'no newline'"));
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["no newline"]);
}

#[tokio::test]
async fn test_chunk_mode_delivers_unterminated_output() {
    // The prompt has no newline, so only chunk mode can deliver it before exit.
    let config = sh("printf 'prompt> '; read line; echo \"got $line\"")
        .with_read_mode(ReadMode::Chunk);
    let mut session = Session::new(config);
    let mut output = session.start().unwrap();

    let prompt = next_line(&mut output).await.unwrap();
    assert_eq!(prompt.text(), "prompt> ");

    session.send("abc").await.unwrap();
    let rest: String = drain(&mut output)
        .await
        .iter()
        .map(DisplayLine::text)
        .collect();
    assert_eq!(rest, "got abc\n");
}

#[tokio::test]
async fn test_working_directory_and_env() {
    let mut config = sh("pwd; echo $MINISHELL_TEST_VAR").with_env("MINISHELL_TEST_VAR", "set");
    config.working_directory = Some("/".to_string());

    let mut session = Session::new(config);
    let mut output = session.start().unwrap();

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["/\n", "set\n"]);
}

#[tokio::test]
async fn test_write_error_when_child_stopped_reading() {
    // The child closes its stdin and keeps running, so writes hit a closed pipe.
    let mut session = Session::new(sh("exec 0<&-; echo ready; sleep 30"));
    let mut output = session.start().unwrap();

    let ready = next_line(&mut output).await.unwrap();
    assert_eq!(ready.text(), "ready\n");

    let result = session.send("echo hi").await;
    assert!(matches!(result, Err(Error::Write(_))));
    assert!(!result.unwrap_err().is_fatal());
    assert!(session.is_alive());

    session.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_are_not_interleaved() {
    let mut session = Session::new(SessionConfig::new("cat"));
    let mut output = session.start().unwrap();
    let session = Arc::new(session);

    let writers: Vec<_> = (0..8)
        .map(|task| {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                for n in 0..25 {
                    let line = format!("task{task}-line{n}-{}", "x".repeat(64));
                    session.send(&line).await.unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap();
    }

    let mut seen = HashSet::new();
    while seen.len() < 200 {
        let line = next_line(&mut output).await.unwrap();
        let text = line.text().strip_suffix('\n').unwrap().to_string();
        assert!(seen.insert(text), "duplicate line");
    }

    for task in 0..8 {
        for n in 0..25 {
            let expected = format!("task{task}-line{n}-{}", "x".repeat(64));
            assert!(seen.contains(&expected), "missing {expected}");
        }
    }

    session.close().await;
}

#[tokio::test]
async fn test_dropped_receiver_does_not_block_child() {
    let mut session = Session::new(sh(
        "i=0; while [ $i -lt 2000 ]; do echo filler-$i; i=$((i+1)); done",
    ));
    let output = session.start().unwrap();
    drop(output);

    for _ in 0..250 {
        if session.status() == SessionStatus::Terminated {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(session.status(), SessionStatus::Terminated);
}

#[tokio::test]
async fn test_close_input_lets_child_finish() {
    let mut session = Session::new(SessionConfig::new("cat"));
    let mut output = session.start().unwrap();

    session.send("last words").await.unwrap();
    session.close_input().await;

    let result = session.send("too late").await;
    assert!(matches!(
        result,
        Err(Error::InputClosed) | Err(Error::SessionTerminated)
    ));

    let lines = drain(&mut output).await;
    assert_eq!(texts(&lines), vec!["last words\n"]);
    assert_eq!(session.status(), SessionStatus::Terminated);
    assert_eq!(session.exit_code(), Some(0));
}
