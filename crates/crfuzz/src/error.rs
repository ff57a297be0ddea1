use thiserror::Error;

/// Harness errors.
///
/// Every variant is an environment fault: failures on the
/// reference-establishing path are silent discards and failures on the
/// candidate path become a [`crate::Divergence`], so an `Error` reaching the
/// top level means the machine is misconfigured, not the translator.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("required tool not found: {0}")]
    ToolMissing(String),
    #[error("preprocessing failed: {0}")]
    Preprocess(String),
    #[error("reduction failed: {0}")]
    Reduction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
