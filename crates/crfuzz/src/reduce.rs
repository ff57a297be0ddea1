//! Reduction driver: preprocess, persist the message, synthesize the
//! launcher, hand off to the external reducer.
//!
//! The re-entry protocol is file-based. The preprocessed candidate source
//! and the persisted divergence message are the only channel between the
//! original failing run and every later oracle callback, and the callback's
//! exit code (0 = still the same bug) is the whole verdict. Any reducer
//! that repeatedly runs an interestingness script against a shrinking file
//! can drive it.

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::compile;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::oracle::Divergence;

/// Minimize `source` down to the smallest program still reproducing
/// `divergence`, leaving the result at the reduced-source path.
///
/// The reducer gets no timeout of its own: it manages its own iteration
/// budget and calls the oracle back synchronously.
///
/// # Errors
/// Environment faults only: preprocessing failure, IO, a missing reducer,
/// or the reducer itself bailing out.
pub fn reduce(config: &Config, source: &Path, divergence: &Divergence) -> Result<()> {
    let reduced = config.reduced_source_path();
    compile::preprocess(config, source, &reduced)?;

    fs::write(config.message_path(), divergence.to_string())?;
    write_launcher(config)?;

    info!(reduced = %reduced.display(), "invoking reducer");
    let status = Command::new(config.tools().creduce())
        .arg(fs::canonicalize(config.launcher_path())?)
        .arg(&reduced)
        // Keep this process's stdout reserved for the divergence message.
        .stdout(Stdio::null())
        .status()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolMissing(config.tools().creduce().to_string())
            } else {
                Error::Io(e)
            }
        })?;
    if !status.success() {
        return Err(Error::Reduction(format!(
            "reducer exited with status {status}"
        )));
    }
    Ok(())
}

/// Write the executable launcher script the reducer calls back through.
///
/// The script replays this process's original argv plus `--check`. The
/// `--check` pair comes first: everything after the first generator flag is
/// forwarded verbatim to the generator, so a flag appended at the end could
/// be swallowed into that bucket. The candidate source is referenced by
/// bare file name because the reducer copies it into a fresh working
/// directory per callback; the message file is pinned by absolute path.
fn write_launcher(config: &Config) -> Result<()> {
    let exe = std::env::current_exe()?;
    let message = fs::canonicalize(config.message_path())?;
    let candidate = config
        .reduced_source_path()
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned());

    let mut script = String::from("#!/bin/sh\nexec ");
    script.push_str(&shell_quote(&exe.to_string_lossy()));
    script.push_str(" --check ");
    script.push_str(&shell_quote(&candidate));
    script.push(' ');
    script.push_str(&shell_quote(&message.to_string_lossy()));
    for arg in config.original_args() {
        script.push(' ');
        script.push_str(&shell_quote(arg));
    }
    script.push('\n');

    let path = config.launcher_path();
    fs::write(&path, script)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Quote one argument for POSIX sh.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-' | b'/' | b'='));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
