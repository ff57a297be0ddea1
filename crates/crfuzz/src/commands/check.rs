//! Re-entrant oracle mode.
//!
//! The reducer copies the candidate source into a fresh working directory
//! and runs the generated launcher script there; the script re-enters this
//! program with `--check <candidate> <message>`. Behavior is rederived from
//! scratch - coverage scan, dual compile, two-mode execution,
//! classification - and the shrink is "interesting" (exit 0) exactly when
//! the recomputed divergence message is byte-identical to the persisted
//! one. Build products reuse the fixed work-dir-relative names of a fresh
//! run so the command strings embedded in the rendered message match; any
//! textual difference, however incidental, rejects the shrink.

use std::fs;
use std::path::Path;

use tracing::debug;

use crfuzz::{Config, Divergence, compile, generate, oracle};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Evaluate one reducer callback.
///
/// # Errors
/// Environment faults only; an unreproducible divergence is a clean exit 1.
pub fn run(config: &Config, candidate: &Path, message: &Path) -> crfuzz::Result<i32> {
    let persisted = fs::read_to_string(message)?;
    let recomputed = recompute(config, candidate)?;
    let reproduced = recomputed
        .as_ref()
        .is_some_and(|divergence| divergence.to_string() == persisted);
    debug!(reproduced, "oracle verdict");
    Ok(if reproduced { EXIT_SUCCESS } else { EXIT_FAILURE })
}

/// Rerun the dual-compile-and-compare pipeline on a candidate source.
///
/// Generation is skipped and so is nothing else: the reference binary is
/// rebuilt from the candidate file and validated exactly as in a fresh run,
/// so a shrink that breaks the reference's trustworthiness comes back as
/// "no divergence" and is rejected.
fn recompute(config: &Config, candidate: &Path) -> crfuzz::Result<Option<Divergence>> {
    let coverage = generate::coverage_of(candidate)?;
    if coverage == 0 {
        return Ok(None);
    }

    let reference = config.reference_binary_path();
    if !compile::compile_reference(config, candidate, &reference)? {
        return Ok(None);
    }

    let binary = config.candidate_binary_path();
    match compile::compile_candidate(config, candidate, &binary)? {
        Some(divergence) => Ok(Some(divergence)),
        None => oracle::compare(config, &reference, &binary, coverage),
    }
}
