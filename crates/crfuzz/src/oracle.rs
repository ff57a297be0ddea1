//! The execution oracle: run both binaries, validate the reference,
//! classify candidate behavior into a canonical divergence.
//!
//! Each binary is run in two output modes: verbose (argv `1`, one line per
//! checksum update) and summary (no argument, a single `checksum = <hex>`
//! line). The reference must first prove itself trustworthy - empty stderr
//! in both modes, verbose line count equal to the source's checksum
//! coverage, summary output matching the fixed checksum-line pattern. An
//! untrustworthy reference abandons the comparison: no conclusion about the
//! candidate can be drawn from it.

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::Result;
use crate::exec::{self, RunOutput};

/// Output mode a binary is run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// One line per checksum update (argv `1`).
    Verbose,
    /// Single final checksum line (no argument).
    Summary,
}

/// One differing line pair in a content mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiff {
    /// Line produced by the reference binary.
    pub expected: String,
    /// Line produced by the candidate binary.
    pub actual: String,
}

/// A behavioral or compile-time difference between the two pipelines.
///
/// The `Display` rendering is canonical: it is what a fuzz run prints, what
/// the reduction driver persists, and what the re-entrant oracle compares
/// byte for byte against the persisted message. Two divergences are the
/// same bug exactly when their renderings are identical; there is no
/// normalization of paths, ordering or values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// The translator rejected or mishandled the source.
    TranslateFailed {
        /// Raw error text of the failing tool.
        output: String,
    },
    /// The derived Rust source did not compile.
    RustCompileFailed {
        /// Raw error text of the failing tool.
        output: String,
    },
    /// The candidate ran past the execution deadline.
    Timeout {
        /// Rendered candidate command.
        command: String,
        /// The execution timeout that expired.
        seconds: u64,
    },
    /// The candidate wrote to stderr.
    Stderr {
        /// Rendered candidate command.
        command: String,
        /// Raw stderr text.
        output: String,
    },
    /// The candidate exited nonzero (negative codes are signals).
    ExitStatus {
        /// Rendered candidate command.
        command: String,
        /// Exit code.
        code: i32,
    },
    /// The candidate wrote nothing to stdout.
    EmptyOutput {
        /// Rendered candidate command.
        command: String,
    },
    /// The candidate printed a different number of lines than the reference.
    LineCountMismatch {
        /// Rendered candidate command.
        command: String,
        /// Raw candidate stdout.
        output: String,
    },
    /// Same line count, at least one differing line pair.
    ContentMismatch {
        /// Rendered candidate command.
        command: String,
        /// The differing line pairs, in output order.
        diffs: Vec<LineDiff>,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TranslateFailed { output } => {
                write!(f, "translating to Rust failed: {output}")
            }
            Self::RustCompileFailed { output } => {
                write!(f, "compiling via Rust failed: {output}")
            }
            Self::Timeout { command, seconds } => {
                write!(f, "'{command}' timed out after {seconds} seconds")
            }
            Self::Stderr { command, output } => write!(f, "'{command}' error: {output}"),
            Self::ExitStatus { command, code } => {
                write!(f, "'{command}' failed with status {code}")
            }
            Self::EmptyOutput { command } => write!(f, "'{command}' produced no output"),
            Self::LineCountMismatch { command, output } => {
                write!(f, "'{command}' produced wrong output: {output}")
            }
            Self::ContentMismatch { command, diffs } => {
                write!(f, "'{command}' produced wrong output:")?;
                for diff in diffs {
                    write!(f, "\nexpected '{}', got '{}'", diff.expected, diff.actual)?;
                }
                Ok(())
            }
        }
    }
}

/// Validated reference outputs, one stdout line vector per mode.
struct TrustedReference {
    verbose: Vec<String>,
    summary: Vec<String>,
}

fn checksum_pattern() -> &'static Regex {
    static CHECKSUM_LINE: OnceLock<Regex> = OnceLock::new();
    CHECKSUM_LINE.get_or_init(|| Regex::new(r"\Achecksum = [0-9A-F]+\n\z").unwrap())
}

/// Match the fixed summary-mode checksum line, anchored over the whole of
/// stdout.
#[must_use]
pub fn is_checksum_line(stdout: &str) -> bool {
    checksum_pattern().is_match(stdout)
}

/// Compare candidate behavior against the reference.
///
/// Verbose mode is evaluated first and its divergence, if any, is the one
/// reported: a per-update trace localizes the fault and reduces better than
/// the final checksum alone. Summary mode is consulted only when verbose
/// output matched exactly. `None` means either no difference or an
/// untrustworthy reference.
///
/// # Errors
/// Only environment faults (a binary that cannot be spawned) are errors.
pub fn compare(
    config: &Config,
    reference: &Path,
    candidate: &Path,
    coverage: usize,
) -> Result<Option<Divergence>> {
    let Some(trusted) = run_reference(config, reference, coverage)? else {
        return Ok(None);
    };

    let seconds = config.timeouts().execute().as_secs();

    let verbose = run_binary(config, candidate, Mode::Verbose)?;
    let command = command_string(candidate, Mode::Verbose);
    if let Some(divergence) = classify(command, &verbose, &trusted.verbose, seconds) {
        return Ok(Some(divergence));
    }

    let summary = run_binary(config, candidate, Mode::Summary)?;
    let command = command_string(candidate, Mode::Summary);
    Ok(classify(command, &summary, &trusted.summary, seconds))
}

/// Run the reference binary in both modes and validate its output.
fn run_reference(
    config: &Config,
    reference: &Path,
    coverage: usize,
) -> Result<Option<TrustedReference>> {
    let verbose = run_binary(config, reference, Mode::Verbose)?;
    if verbose.timed_out || !verbose.stderr.is_empty() {
        debug!("reference verbose run untrustworthy; discarding");
        return Ok(None);
    }
    let verbose_lines = to_lines(&verbose.stdout);
    if verbose_lines.len() != coverage {
        debug!(
            lines = verbose_lines.len(),
            coverage, "reference line count disagrees with coverage; discarding"
        );
        return Ok(None);
    }

    let summary = run_binary(config, reference, Mode::Summary)?;
    if summary.timed_out || !summary.stderr.is_empty() || !is_checksum_line(&summary.stdout) {
        debug!("reference summary run untrustworthy; discarding");
        return Ok(None);
    }

    Ok(Some(TrustedReference {
        verbose: verbose_lines,
        summary: to_lines(&summary.stdout),
    }))
}

fn run_binary(config: &Config, binary: &Path, mode: Mode) -> Result<RunOutput> {
    let mut cmd = Command::new(binary);
    if mode == Mode::Verbose {
        cmd.arg("1");
    }
    trace!(binary = %binary.display(), ?mode, "running");
    exec::run_with_timeout(&mut cmd, config.timeouts().execute())
}

fn command_string(binary: &Path, mode: Mode) -> String {
    match mode {
        Mode::Verbose => format!("{} 1", binary.display()),
        Mode::Summary => binary.display().to_string(),
    }
}

/// Classify one candidate run against the trusted reference lines.
///
/// The priority order - timeout, stderr, exit status, empty output, line
/// count, content - is part of the oracle's contract: re-entrant checks
/// must classify a reproduction identically or reduction cannot make
/// progress.
fn classify(
    command: String,
    run: &RunOutput,
    expected: &[String],
    timeout_seconds: u64,
) -> Option<Divergence> {
    if run.timed_out {
        return Some(Divergence::Timeout {
            command,
            seconds: timeout_seconds,
        });
    }
    if !run.stderr.is_empty() {
        return Some(Divergence::Stderr {
            command,
            output: run.stderr.clone(),
        });
    }
    if !run.success() {
        return Some(Divergence::ExitStatus {
            command,
            code: run.status.unwrap_or(-1),
        });
    }
    if run.stdout.is_empty() {
        return Some(Divergence::EmptyOutput { command });
    }

    let actual = to_lines(&run.stdout);
    if actual.len() != expected.len() {
        return Some(Divergence::LineCountMismatch {
            command,
            output: run.stdout.clone(),
        });
    }

    let diffs: Vec<LineDiff> = expected
        .iter()
        .zip(&actual)
        .filter(|(expected_line, actual_line)| expected_line != actual_line)
        .map(|(expected_line, actual_line)| LineDiff {
            expected: expected_line.clone(),
            actual: actual_line.clone(),
        })
        .collect();
    if diffs.is_empty() {
        None
    } else {
        Some(Divergence::ContentMismatch { command, diffs })
    }
}

fn to_lines(stdout: &str) -> Vec<String> {
    stdout.lines().map(str::to_owned).collect()
}
