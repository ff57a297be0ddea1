//! The dual compiler: native reference path and translate-then-rustc path.
//!
//! The two paths are judged asymmetrically. A program the reference compiler
//! rejects cannot expose translator bugs, so reference failures are silent
//! discards. The candidate path is the system under test: a translator or
//! rustc failure there is a reportable compile-time divergence carrying the
//! failing tool's raw error text.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exec::{self, RunOutput};
use crate::oracle::Divergence;

/// Feature-limiting macros defined for the reference compiler, the
/// preprocessor and the translator alike, keeping the three tool
/// environments flag-identical.
pub const FEATURE_MACROS: &[&str] = &["-DCSMITH_MINIMAL", "-DSTANDALONE"];

/// Compile `source` natively with the trusted reference compiler.
///
/// Warnings are suppressed; the generator's output is not expected to be
/// warning-clean. Returns `false` on a compile failure or timeout, which
/// discards the whole test case.
///
/// # Errors
/// Only environment faults (compiler missing, IO) are errors.
pub fn compile_reference(config: &Config, source: &Path, output: &Path) -> Result<bool> {
    let mut cmd = Command::new(config.tools().cc());
    cmd.arg("-w")
        .args(FEATURE_MACROS)
        .args(config.toolchain_flags())
        .arg(source)
        .arg("-o")
        .arg(output);

    let run = exec::run_with_timeout(&mut cmd, config.timeouts().compile())?;
    if !run.success() {
        debug!(timed_out = run.timed_out, "reference compile failed; discarding");
        return Ok(false);
    }
    Ok(true)
}

/// Path of the derived source the translator writes: the C file with its
/// extension replaced.
#[must_use]
pub fn derived_source(source: &Path) -> PathBuf {
    source.with_extension("rs")
}

/// Run the candidate pipeline: translate `source` to Rust, then compile the
/// derived file into `output`.
///
/// Returns the compile-time divergence when either sub-step exits nonzero,
/// times out, or fails to produce its output file.
///
/// # Errors
/// Only environment faults (tool missing, IO) are errors.
pub fn compile_candidate(
    config: &Config,
    source: &Path,
    output: &Path,
) -> Result<Option<Divergence>> {
    let derived = derived_source(source);
    // A leftover derived file from an earlier run must not satisfy the
    // existence check below.
    let _ = std::fs::remove_file(&derived);

    let mut cmd = Command::new(config.tools().translator());
    cmd.args(FEATURE_MACROS)
        .args(config.toolchain_flags())
        .arg(source);
    let run = exec::run_with_timeout(&mut cmd, config.timeouts().compile())?;
    if !run.success() {
        return Ok(Some(Divergence::TranslateFailed {
            output: failure_text(&run, config.timeouts().compile()),
        }));
    }
    if !derived.exists() {
        return Ok(Some(Divergence::TranslateFailed {
            output: format!("no {} produced", derived.display()),
        }));
    }

    let mut cmd = Command::new(config.tools().rustc());
    cmd.arg("--edition")
        .arg("2021")
        .arg("-A")
        .arg("warnings")
        .arg(&derived)
        .arg("-o")
        .arg(output);
    let run = exec::run_with_timeout(&mut cmd, config.timeouts().compile())?;
    if !run.success() {
        return Ok(Some(Divergence::RustCompileFailed {
            output: failure_text(&run, config.timeouts().compile()),
        }));
    }
    Ok(None)
}

/// Run the reference compiler's preprocessor alone, writing to `output`.
///
/// The reducer shrinks preprocessed sources far better than ones with live
/// `#include`s, so the reduction driver preprocesses before handing off.
///
/// # Errors
/// Returns [`Error::Preprocess`] when the preprocessor fails; unlike the
/// compile paths there is no discard-or-report choice left at this point.
pub fn preprocess(config: &Config, source: &Path, output: &Path) -> Result<()> {
    let mut cmd = Command::new(config.tools().cc());
    cmd.arg("-E")
        .arg("-w")
        .args(FEATURE_MACROS)
        .args(config.toolchain_flags())
        .arg(source)
        .arg("-o")
        .arg(output);

    let run = exec::run_with_timeout(&mut cmd, config.timeouts().compile())?;
    if !run.success() {
        return Err(Error::Preprocess(failure_text(
            &run,
            config.timeouts().compile(),
        )));
    }
    Ok(())
}

/// Error text carried inside a compile-time divergence: the tool's stderr
/// when there is any, otherwise a description of how it stopped.
fn failure_text(run: &RunOutput, timeout: Duration) -> String {
    if run.timed_out {
        format!("timed out after {} seconds", timeout.as_secs())
    } else if run.stderr.is_empty() {
        format!("exited with status {}", run.status.unwrap_or(-1))
    } else {
        run.stderr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_source_replaces_extension() {
        assert_eq!(
            derived_source(Path::new("./testcase.c")),
            PathBuf::from("./testcase.rs")
        );
        assert_eq!(
            derived_source(Path::new("work/testcase_min.c")),
            PathBuf::from("work/testcase_min.rs")
        );
    }

    #[test]
    fn failure_text_prefers_stderr() {
        let run = RunOutput {
            stdout: String::new(),
            stderr: "error: bad\n".to_string(),
            status: Some(1),
            timed_out: false,
        };
        assert_eq!(failure_text(&run, Duration::from_secs(30)), "error: bad\n");
    }

    #[test]
    fn failure_text_reports_silent_exit() {
        let run = RunOutput {
            stdout: String::new(),
            stderr: String::new(),
            status: Some(2),
            timed_out: false,
        };
        assert_eq!(
            failure_text(&run, Duration::from_secs(30)),
            "exited with status 2"
        );
    }

    #[test]
    fn failure_text_reports_timeout() {
        let run = RunOutput {
            stdout: String::new(),
            stderr: "partial".to_string(),
            status: None,
            timed_out: true,
        };
        assert_eq!(
            failure_text(&run, Duration::from_secs(30)),
            "timed out after 30 seconds"
        );
    }
}
