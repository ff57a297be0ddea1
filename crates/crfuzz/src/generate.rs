//! Random program generation and the checksum-coverage filter.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::exec;

/// Generator features disabled on every run: constructs the translation
/// pipeline is not exercised on.
pub const GENERATOR_RESTRICTIONS: &[&str] = &[
    "--no-arrays",
    "--no-bitfields",
    "--no-jumps",
    "--no-packed-struct",
    "--no-pointers",
    "--no-unions",
    "--no-volatiles",
    "--no-builtins",
];

/// Invoke the generator, writing the program to the configured source path.
///
/// `--output` is appended last so user-supplied generator flags cannot
/// redirect the file elsewhere. Returns `None` on a nonzero exit or a
/// timeout: a generator failure carries no information about the translator
/// and is silently discarded.
///
/// # Errors
/// Only environment faults (generator missing, IO) are errors.
pub fn generate(config: &Config) -> Result<Option<PathBuf>> {
    let source = config.source_path();
    let mut cmd = Command::new(config.tools().csmith());
    cmd.args(GENERATOR_RESTRICTIONS)
        .args(config.generator_flags())
        .arg("--output")
        .arg(&source);

    let run = exec::run_with_timeout(&mut cmd, config.timeouts().generate())?;
    if !run.success() {
        debug!(
            timed_out = run.timed_out,
            status = ?run.status,
            "generator failed; discarding"
        );
        return Ok(None);
    }
    Ok(Some(source))
}

fn crc_call_pattern() -> &'static Regex {
    static CRC_CALL: OnceLock<Regex> = OnceLock::new();
    CRC_CALL.get_or_init(|| Regex::new(r"(?m)^[ \t]*transparent_crc\(").unwrap())
}

/// Count checksum-update statements in a source text.
///
/// Matches `transparent_crc(` in statement position (start of line, leading
/// whitespace allowed) so the runtime's own declaration and definition of
/// the function, inlined once the source has been preprocessed, do not
/// inflate the count. The verbose-mode run prints exactly one line per
/// counted statement; that equality is the reference-trust invariant.
#[must_use]
pub fn checksum_coverage(source: &str) -> usize {
    crc_call_pattern().find_iter(source).count()
}

/// Read a source file and count its checksum-update statements.
///
/// # Errors
/// Returns an error when the file cannot be read.
pub fn coverage_of(path: &Path) -> Result<usize> {
    Ok(checksum_coverage(&std::fs::read_to_string(path)?))
}
