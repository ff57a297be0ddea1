//! crfuzz - differential-testing harness for a C-to-Rust translator.
//!
//! Generates random C programs with csmith, compiles each one natively with
//! a trusted reference compiler and independently through
//! translate-then-rustc, runs both binaries in two output modes, and
//! classifies any difference into a canonical [`Divergence`]. A found
//! divergence is minimized with an external reducer (creduce) driven by a
//! re-entrant oracle exposed by this same binary.
//!
//! # Example
//!
//! ```ignore
//! use crfuzz::{Config, generate};
//!
//! let config = Config::new();
//! let source = generate::generate(&config)?.expect("generator succeeded");
//! let coverage = generate::coverage_of(&source)?;
//! ```

pub mod compile;
pub mod config;
pub mod error;
pub mod exec;
pub mod generate;
pub mod oracle;
pub mod reduce;

pub use config::{Config, Timeouts, Tools};
pub use error::{Error, Result};
pub use oracle::{Divergence, LineDiff};
