//! Frozen run configuration.
//!
//! Built once from the command line and passed by reference into every
//! component; nothing in here mutates after startup. Artifact paths are
//! fixed names under the work directory, overwritten each run: the same
//! names must resolve both in a fresh run and in every re-entrant oracle
//! callback, because the rendered divergence message embeds them.

use std::path::{Path, PathBuf};
use std::time::Duration;

const SOURCE_FILE: &str = "testcase.c";
const REFERENCE_BINARY: &str = "testcase_ref";
const CANDIDATE_BINARY: &str = "testcase_rust";
const REDUCED_SOURCE: &str = "testcase_min.c";
const MESSAGE_FILE: &str = "testcase.err";
const LAUNCHER_FILE: &str = "interesting.sh";

/// External collaborator commands.
///
/// Accepts any command name or path; resolution happens at spawn time via
/// `PATH`, and a missing tool aborts the run.
#[derive(Clone, Debug)]
pub struct Tools {
    csmith: String,
    cc: String,
    translator: String,
    rustc: String,
    creduce: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            csmith: "csmith".to_string(),
            cc: "gcc".to_string(),
            translator: "c2rust".to_string(),
            rustc: "rustc".to_string(),
            creduce: "creduce".to_string(),
        }
    }
}

impl Tools {
    /// Random program generator command.
    #[must_use]
    pub fn csmith(&self) -> &str {
        &self.csmith
    }

    /// Trusted reference C compiler command.
    #[must_use]
    pub fn cc(&self) -> &str {
        &self.cc
    }

    /// C-to-Rust translator under test.
    #[must_use]
    pub fn translator(&self) -> &str {
        &self.translator
    }

    /// Rust compiler for the derived source.
    #[must_use]
    pub fn rustc(&self) -> &str {
        &self.rustc
    }

    /// Program reducer driven on each divergence.
    #[must_use]
    pub fn creduce(&self) -> &str {
        &self.creduce
    }

    /// Set the generator command.
    #[must_use]
    pub fn with_csmith(mut self, command: impl Into<String>) -> Self {
        self.csmith = command.into();
        self
    }

    /// Set the reference compiler command.
    #[must_use]
    pub fn with_cc(mut self, command: impl Into<String>) -> Self {
        self.cc = command.into();
        self
    }

    /// Set the translator command.
    #[must_use]
    pub fn with_translator(mut self, command: impl Into<String>) -> Self {
        self.translator = command.into();
        self
    }

    /// Set the Rust compiler command.
    #[must_use]
    pub fn with_rustc(mut self, command: impl Into<String>) -> Self {
        self.rustc = command.into();
        self
    }

    /// Set the reducer command.
    #[must_use]
    pub fn with_creduce(mut self, command: impl Into<String>) -> Self {
        self.creduce = command.into();
        self
    }
}

/// The three timeout tiers bounding every external invocation.
///
/// A timed-out generation or reference compilation is an ordinary discard;
/// a timed-out candidate step is a finding.
#[derive(Clone, Copy, Debug)]
pub struct Timeouts {
    generate: Duration,
    compile: Duration,
    execute: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            generate: Duration::from_secs(10),
            compile: Duration::from_secs(30),
            execute: Duration::from_secs(5),
        }
    }
}

impl Timeouts {
    /// Bound on one generator invocation.
    #[must_use]
    pub const fn generate(self) -> Duration {
        self.generate
    }

    /// Bound on one compiler, translator or preprocessor invocation.
    #[must_use]
    pub const fn compile(self) -> Duration {
        self.compile
    }

    /// Bound on one binary execution.
    #[must_use]
    pub const fn execute(self) -> Duration {
        self.execute
    }

    /// Set the generation bound.
    #[must_use]
    pub const fn with_generate(mut self, timeout: Duration) -> Self {
        self.generate = timeout;
        self
    }

    /// Set the compilation bound.
    #[must_use]
    pub const fn with_compile(mut self, timeout: Duration) -> Self {
        self.compile = timeout;
        self
    }

    /// Set the execution bound.
    #[must_use]
    pub const fn with_execute(mut self, timeout: Duration) -> Self {
        self.execute = timeout;
        self
    }
}

/// Immutable configuration for one run, frozen at startup.
#[derive(Clone, Debug)]
pub struct Config {
    tools: Tools,
    timeouts: Timeouts,
    toolchain_flags: Vec<String>,
    generator_flags: Vec<String>,
    work_dir: PathBuf,
    original_args: Vec<String>,
}

impl Default for Config {
    /// Defaults with the current directory as work dir. The directory is
    /// kept in every artifact path (`./testcase_rust`, not `testcase_rust`)
    /// so binaries spawn without a `PATH` lookup.
    fn default() -> Self {
        Self {
            tools: Tools::default(),
            timeouts: Timeouts::default(),
            toolchain_flags: Vec::new(),
            generator_flags: Vec::new(),
            work_dir: PathBuf::from("."),
            original_args: Vec::new(),
        }
    }
}

impl Config {
    /// Configuration with defaults and the current directory as work dir.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// External tool commands.
    #[must_use]
    pub const fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Timeout tiers.
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// `-I`/`-D`/`-U` flags forwarded to every compiler, preprocessor and
    /// translator invocation.
    #[must_use]
    pub fn toolchain_flags(&self) -> &[String] {
        &self.toolchain_flags
    }

    /// Flags forwarded verbatim to the generator.
    #[must_use]
    pub fn generator_flags(&self) -> &[String] {
        &self.generator_flags
    }

    /// Directory all artifacts are written to.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The argv this process was started with (minus the program name),
    /// replayed by the reduction launcher script.
    #[must_use]
    pub fn original_args(&self) -> &[String] {
        &self.original_args
    }

    /// Set the external tool commands.
    #[must_use]
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// Set the timeout tiers.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the toolchain flags.
    #[must_use]
    pub fn with_toolchain_flags(mut self, flags: Vec<String>) -> Self {
        self.toolchain_flags = flags;
        self
    }

    /// Set the generator flags.
    #[must_use]
    pub fn with_generator_flags(mut self, flags: Vec<String>) -> Self {
        self.generator_flags = flags;
        self
    }

    /// Set the work directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Set the original argv.
    #[must_use]
    pub fn with_original_args(mut self, args: Vec<String>) -> Self {
        self.original_args = args;
        self
    }

    /// Path the generator writes the random program to.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.work_dir.join(SOURCE_FILE)
    }

    /// Path of the native reference binary.
    #[must_use]
    pub fn reference_binary_path(&self) -> PathBuf {
        self.work_dir.join(REFERENCE_BINARY)
    }

    /// Path of the binary compiled from the derived Rust source.
    #[must_use]
    pub fn candidate_binary_path(&self) -> PathBuf {
        self.work_dir.join(CANDIDATE_BINARY)
    }

    /// Path of the preprocessed source the reducer shrinks in place; the
    /// minimized reproducer is left here.
    #[must_use]
    pub fn reduced_source_path(&self) -> PathBuf {
        self.work_dir.join(REDUCED_SOURCE)
    }

    /// Path the divergence message is persisted to.
    #[must_use]
    pub fn message_path(&self) -> PathBuf {
        self.work_dir.join(MESSAGE_FILE)
    }

    /// Path of the generated re-entry launcher script.
    #[must_use]
    pub fn launcher_path(&self) -> PathBuf {
        self.work_dir.join(LAUNCHER_FILE)
    }
}
