//! Bounded subprocess execution
//!
//! Every external tool (git, helm, dyff) runs through a [`CommandRunner`].
//! The system implementation never uses a shell, closes stdin, caps each
//! output stream, enforces a deadline and honours a shared [`CancelToken`].

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use chartdiff_core::ChartDiffError;
use chartdiff_core_types::redact_userinfo;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);
const REAP_TIMEOUT: Duration = Duration::from_secs(5);
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared cancellation flag for sibling stages
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One argv invocation with its budget
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
    /// Cap per output stream, in bytes
    pub max_output: usize,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
            timeout: Duration::from_secs(60),
            max_output: 1024 * 1024,
        }
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_output(mut self, bytes: usize) -> Self {
        self.max_output = bytes;
        self
    }

    /// Command line for logs, with URL credentials masked
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(redact_userinfo)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Program basename, used as the op of runner errors
    pub fn tool_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.clone())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when terminated by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Stderr when present, stdout otherwise
    pub fn failure_detail(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Seam between the pipeline and the operating system
pub trait CommandRunner: Send + Sync {
    /// Run to completion
    ///
    /// # Errors
    ///
    /// `Timeout`, `OutputLimitExceeded`, `Cancelled` or `ToolUnavailable`.
    /// A non-zero exit is not an error at this level.
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> Result<ProcessOutput>;
}

/// Runs real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

struct StreamReader {
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    overflow: Arc<AtomicBool>,
}

impl StreamReader {
    fn spawn<R: Read + Send + 'static>(stream: R, cap: usize) -> Self {
        let overflow = Arc::new(AtomicBool::new(false));
        let flag = overflow.clone();
        let handle = std::thread::spawn(move || {
            let mut buf = Vec::new();
            let limit = u64::try_from(cap).unwrap_or(u64::MAX).saturating_add(1);
            stream.take(limit).read_to_end(&mut buf)?;
            if buf.len() > cap {
                flag.store(true, Ordering::SeqCst);
                buf.truncate(cap);
            }
            Ok(buf)
        });
        Self { handle, overflow }
    }

    fn overflowed(&self) -> bool {
        self.overflow.load(Ordering::SeqCst)
    }

    /// Join with a bound; a stuck reader is abandoned and reported
    fn finish(self) -> std::io::Result<(Vec<u8>, bool)> {
        let deadline = Instant::now() + READER_JOIN_TIMEOUT;
        while !self.handle.is_finished() {
            if Instant::now() >= deadline {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "output reader did not finish",
                ));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        let overflowed = self.overflowed();
        let buf = self
            .handle
            .join()
            .map_err(|_| std::io::Error::other("output reader panicked"))??;
        Ok((buf, overflowed))
    }
}

/// Collect one stream, naming it in any failure
fn collect(reader: Option<StreamReader>, tool: &str, stream: &str) -> Result<(Vec<u8>, bool)> {
    match reader {
        Some(reader) => Ok(reader.finish().map_err(|e| ChartDiffError::Internal {
            message: format!("failed to read {} {}: {}", tool, stream, e),
        })?),
        None => Ok((Vec::new(), false)),
    }
}

enum Stop {
    Exited(Option<i32>),
    TimedOut,
    Overflow,
    Cancelled,
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> Result<ProcessOutput> {
        let tool = spec.tool_name();
        if cancel.is_cancelled() {
            return Err(ChartDiffError::Cancelled { program: tool }.into());
        }

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }

        tracing::debug!(command = %spec.display(), timeout_secs = spec.timeout.as_secs(), "spawning");
        let mut child = command.spawn().map_err(|e| ChartDiffError::ToolUnavailable {
            program: tool.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child.stdout.take().map(|s| StreamReader::spawn(s, spec.max_output));
        let stderr = child.stderr.take().map(|s| StreamReader::spawn(s, spec.max_output));

        let deadline = Instant::now() + spec.timeout;
        let stop = loop {
            if stdout.as_ref().is_some_and(StreamReader::overflowed)
                || stderr.as_ref().is_some_and(StreamReader::overflowed)
            {
                break Stop::Overflow;
            }
            match child.try_wait() {
                Ok(Some(status)) => break Stop::Exited(status.code()),
                Ok(None) => {}
                Err(_) => break Stop::Exited(None),
            }
            if cancel.is_cancelled() {
                break Stop::Cancelled;
            }
            if Instant::now() >= deadline {
                break Stop::TimedOut;
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if !matches!(stop, Stop::Exited(_)) {
            terminate(&mut child);
        }
        drop(child);

        // Output is only read back after a clean exit; other stops abandon the readers
        let stop = match stop {
            Stop::Exited(status) => {
                let (stdout, stdout_over) = collect(stdout, &tool, "stdout")?;
                let (stderr, stderr_over) = collect(stderr, &tool, "stderr")?;
                if !(stdout_over || stderr_over) {
                    tracing::debug!(command = %spec.display(), status = ?status, "process exited");
                    return Ok(ProcessOutput {
                        status,
                        stdout: String::from_utf8_lossy(&stdout).into_owned(),
                        stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    });
                }
                Stop::Overflow
            }
            other => other,
        };

        match stop {
            Stop::TimedOut => {
                tracing::warn!(command = %spec.display(), "process timed out");
                Err(ChartDiffError::Timeout {
                    program: tool,
                    timeout_secs: spec.timeout.as_secs(),
                }
                .into())
            }
            Stop::Overflow | Stop::Exited(_) => {
                tracing::warn!(command = %spec.display(), "process output limit exceeded");
                Err(ChartDiffError::OutputLimit {
                    program: tool,
                    limit_bytes: spec.max_output,
                }
                .into())
            }
            Stop::Cancelled => Err(ChartDiffError::Cancelled { program: tool }.into()),
        }
    }
}

/// Kill and reap within a bound
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let deadline = Instant::now() + REAP_TIMEOUT;
    loop {
        match child.try_wait() {
            Ok(None) if Instant::now() < deadline => std::thread::sleep(POLL_INTERVAL),
            _ => return,
        }
    }
}
