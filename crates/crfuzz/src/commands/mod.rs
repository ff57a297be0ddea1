//! Command implementations.
//!
//! A run is either one fresh fuzz cycle or a single re-entrant oracle check
//! on behalf of the reducer.

pub mod check;
pub mod fuzz;

use tracing::error;

use crfuzz::Config;

use crate::cli::{Cli, EXIT_ERROR};

/// Dispatch to the requested run mode.
///
/// Environment faults map to [`EXIT_ERROR`]: a missing tool or an IO error
/// says the machine is misconfigured, and in re-entry mode any nonzero exit
/// already reads as "not interesting" to the reducer.
pub fn run_command(cli: &Cli, config: &Config) -> i32 {
    let result = match cli.check_pair() {
        Some((candidate, message)) => check::run(config, candidate, message),
        None => fuzz::run(config),
    };
    result.unwrap_or_else(|e| {
        error!("{e}");
        EXIT_ERROR
    })
}
