//! Timeout-bounded subprocess execution.
//!
//! Every external invocation goes through [`run_with_timeout`]: spawn with
//! piped stdio, drain both pipes on reader threads, poll `try_wait`, kill at
//! the deadline. The drain threads keep a chatty child from blocking on a
//! full pipe while the parent only polls for exit.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured outcome of one bounded subprocess run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
    /// Exit code; `-signal` when the process died to a signal, `None` when
    /// the deadline killed it.
    pub status: Option<i32>,
    /// True when the process was killed at the deadline.
    pub timed_out: bool,
}

impl RunOutput {
    /// True when the process finished on its own with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Run `cmd` to completion or until `timeout` elapses, capturing output.
///
/// # Errors
/// Returns [`Error::ToolMissing`] when the executable cannot be found, and
/// [`Error::Io`] for any other spawn or wait failure. A nonzero exit or a
/// timeout is not an error; it is reported through the returned
/// [`RunOutput`].
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<RunOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolMissing(program)
        } else {
            Error::Io(e)
        }
    })?;

    let stdout = child.stdout.take().map(spawn_reader);
    let stderr = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let (status, timed_out) = loop {
        if let Some(status) = child.try_wait()? {
            break (Some(exit_code(status)), false);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            break (None, true);
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(RunOutput {
        stdout: join_reader(stdout),
        stderr: join_reader(stderr),
        status,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    let bytes = handle.and_then(|h| h.join().ok()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| status.signal().map_or(-1, |signal| -signal))
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
