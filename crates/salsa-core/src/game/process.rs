//! Child process execution with line-streamed output.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{Result, SalsaError};

/// Which pipe a line of output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Receives each non-blank output line of a child process
pub type OutputObserver = dyn Fn(OutputStream, &str) + Send + Sync;

/// Run `program` to completion
///
/// Exit code 0 is success; anything else is a [`SalsaError::Process`]. When
/// `cancel` fires the child is killed and [`SalsaError::Cancelled`] returned.
pub async fn run_process(
    program: &Path,
    args: &[String],
    observer: Option<&OutputObserver>,
    cancel: &CancellationToken,
) -> Result<()> {
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SalsaError::Process(format!("failed to start {}: {}", name, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SalsaError::Process(format!("{}: stdout not captured", name)))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| SalsaError::Process(format!("{}: stderr not captured", name)))?;

    let mut stdout = BufReader::new(stdout).lines();
    let mut stderr = BufReader::new(stderr).lines();
    let mut stdout_open = true;
    let mut stderr_open = true;

    let emit = |stream: OutputStream, line: &str| {
        if line.trim().is_empty() {
            return;
        }
        match stream {
            OutputStream::Stdout => log::info!("{}: {}", name, line),
            OutputStream::Stderr => log::warn!("{}: {}", name, line),
        }
        if let Some(observer) = observer {
            observer(stream, line);
        }
    };

    while stdout_open || stderr_open {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                return Err(SalsaError::Cancelled);
            }
            line = stdout.next_line(), if stdout_open => match line? {
                Some(line) => emit(OutputStream::Stdout, &line),
                None => stdout_open = false,
            },
            line = stderr.next_line(), if stderr_open => match line? {
                Some(line) => emit(OutputStream::Stderr, &line),
                None => stderr_open = false,
            },
        }
    }

    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            return Err(SalsaError::Cancelled);
        }
        status = child.wait() => status?,
    };

    if status.success() {
        Ok(())
    } else {
        let code = status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "a signal".to_string());
        log::error!("{} exited with {}", name, code);
        Err(SalsaError::Process(format!("{} exited with {}", name, code)))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_streams_both_pipes() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&lines);
        let observer = move |stream: OutputStream, line: &str| {
            recorded.lock().unwrap().push((stream, line.to_string()));
        };

        run_process(
            Path::new("sh"),
            &sh("echo one; echo; echo two 1>&2"),
            Some(&observer),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let lines = lines.lock().unwrap().clone();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&(OutputStream::Stdout, "one".to_string())));
        assert!(lines.contains(&(OutputStream::Stderr, "two".to_string())));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_process_error() {
        let err = run_process(Path::new("sh"), &sh("exit 3"), None, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            SalsaError::Process(msg) => assert!(msg.contains("exited with 3")),
            other => panic!("expected process error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = run_process(
            Path::new("/nonexistent/salsa-test-binary"),
            &[],
            None,
            &CancellationToken::new(),
        )
        .await;
        assert!(matches!(result, Err(SalsaError::Process(_))));
    }

    #[tokio::test]
    async fn test_cancel_kills_child() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = run_process(Path::new("sh"), &sh("sleep 10"), None, &cancel).await;

        assert!(matches!(result, Err(SalsaError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
