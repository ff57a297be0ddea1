//! CLI definitions and argument classification.
//!
//! argv splits into three disjoint buckets: toolchain flags (`-I`/`-D`/`-U`)
//! forwarded to every compiler, preprocessor and translator invocation; an
//! optional `--check` pair that switches the process into the re-entrant
//! oracle mode; and everything else, forwarded verbatim to the generator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser};
use crfuzz::{Config, Timeouts, Tools};

/// Exit code for a clean run (no divergence / reproduction confirmed).
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a found divergence / failed reproduction.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for an environment fault (missing tool, IO error).
pub const EXIT_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "crfuzz")]
#[command(about = "Differential tester for a C-to-Rust translator")]
#[command(version)]
pub struct Cli {
    /// Include path forwarded to every compiler and translator invocation
    #[arg(short = 'I', value_name = "DIR", action = ArgAction::Append)]
    pub include: Vec<String>,

    /// Macro to define in every compiler and translator invocation
    #[arg(short = 'D', value_name = "NAME[=VALUE]", action = ArgAction::Append)]
    pub define: Vec<String>,

    /// Macro to undefine in every compiler and translator invocation
    #[arg(short = 'U', value_name = "NAME", action = ArgAction::Append)]
    pub undefine: Vec<String>,

    /// Re-entry oracle mode: recompute CANDIDATE's divergence and exit 0
    /// only when it is byte-identical to the message persisted in MESSAGE
    #[arg(long, num_args = 2, value_names = ["CANDIDATE", "MESSAGE"])]
    pub check: Option<Vec<PathBuf>>,

    /// Random program generator command
    #[arg(long, default_value = "csmith", value_name = "BIN")]
    pub csmith: String,

    /// Trusted reference C compiler command
    #[arg(long, default_value = "gcc", value_name = "BIN")]
    pub cc: String,

    /// C-to-Rust translator under test
    #[arg(long, default_value = "c2rust", value_name = "BIN")]
    pub translator: String,

    /// Rust compiler for the derived source
    #[arg(long, default_value = "rustc", value_name = "BIN")]
    pub rustc: String,

    /// Program reducer driven on each divergence
    #[arg(long, default_value = "creduce", value_name = "BIN")]
    pub creduce: String,

    /// Generation timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    pub gen_timeout: u64,

    /// Compilation/translation timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub compile_timeout: u64,

    /// Execution timeout in seconds
    #[arg(long, default_value = "5", value_name = "SECS")]
    pub run_timeout: u64,

    /// Directory test artifacts are written to
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR")]
    pub output: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub silent: bool,

    /// Remaining flags, forwarded verbatim to the generator
    #[arg(
        value_name = "GENERATOR_FLAGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub generator_flags: Vec<String>,
}

impl Cli {
    /// The `(candidate, message)` pair when `--check` was given.
    #[must_use]
    pub fn check_pair(&self) -> Option<(&Path, &Path)> {
        self.check.as_deref().and_then(|pair| match pair {
            [candidate, message] => Some((candidate.as_path(), message.as_path())),
            _ => None,
        })
    }

    /// Freeze the parsed arguments into the run configuration.
    ///
    /// `original_args` is this process's argv minus the program name; the
    /// reduction launcher replays it so every re-entrant check runs under
    /// the identical configuration.
    #[must_use]
    pub fn frozen_config(&self, original_args: Vec<String>) -> Config {
        let mut toolchain_flags = Vec::new();
        toolchain_flags.extend(self.include.iter().map(|v| format!("-I{v}")));
        toolchain_flags.extend(self.define.iter().map(|v| format!("-D{v}")));
        toolchain_flags.extend(self.undefine.iter().map(|v| format!("-U{v}")));

        let tools = Tools::default()
            .with_csmith(&self.csmith)
            .with_cc(&self.cc)
            .with_translator(&self.translator)
            .with_rustc(&self.rustc)
            .with_creduce(&self.creduce);
        let timeouts = Timeouts::default()
            .with_generate(Duration::from_secs(self.gen_timeout))
            .with_compile(Duration::from_secs(self.compile_timeout))
            .with_execute(Duration::from_secs(self.run_timeout));

        Config::new()
            .with_tools(tools)
            .with_timeouts(timeouts)
            .with_toolchain_flags(toolchain_flags)
            .with_generator_flags(self.generator_flags.clone())
            .with_work_dir(self.output.clone())
            .with_original_args(original_args)
    }
}
