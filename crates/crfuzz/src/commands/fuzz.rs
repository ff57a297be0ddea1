//! One generate -> filter -> dual-compile -> compare -> reduce cycle.

use tracing::{debug, error, info};

use crfuzz::{Config, compile, generate, oracle, reduce};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};

/// Run one full differential test cycle.
///
/// Exit 0 covers both "no divergence" and every silent discard on the
/// reference-establishing path; exit 1 means a divergence was found,
/// printed to stdout, persisted and handed to the reducer. A failed
/// reduction never masks the divergence itself.
///
/// # Errors
/// Environment faults only; discards and findings are not errors.
pub fn run(config: &Config) -> crfuzz::Result<i32> {
    let Some(source) = generate::generate(config)? else {
        return Ok(EXIT_SUCCESS);
    };

    let coverage = generate::coverage_of(&source)?;
    if coverage == 0 {
        debug!("no checksum coverage; discarding");
        return Ok(EXIT_SUCCESS);
    }
    info!(source = %source.display(), coverage, "testing generated program");

    let reference = config.reference_binary_path();
    if !compile::compile_reference(config, &source, &reference)? {
        return Ok(EXIT_SUCCESS);
    }

    let candidate = config.candidate_binary_path();
    let divergence = match compile::compile_candidate(config, &source, &candidate)? {
        Some(divergence) => Some(divergence),
        None => oracle::compare(config, &reference, &candidate, coverage)?,
    };

    let Some(divergence) = divergence else {
        debug!("no divergence");
        return Ok(EXIT_SUCCESS);
    };

    println!("{divergence}");
    if let Err(e) = reduce::reduce(config, &source, &divergence) {
        error!("reduction failed: {e}");
    }
    Ok(EXIT_FAILURE)
}
