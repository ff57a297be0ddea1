//! Live smoke test against the real external toolchain.
//!
//! Runs only when csmith and gcc are actually installed; the translator
//! under test is stubbed out with a failing script so the run exercises
//! generation, filtering and the reference path end-to-end without needing
//! a real C-to-Rust translator on the machine.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use libtest_mimic::{Arguments, Failed, Trial};

fn main() {
    let args = Arguments::from_args();
    let trials = vec![Trial::test("live_generate_and_compare", live_cycle)];
    libtest_mimic::run(&args, trials).exit();
}

fn live_cycle() -> Result<(), Failed> {
    let (Some(csmith), Some(gcc)) = (find_in_path("csmith"), find_in_path("gcc")) else {
        // External toolchain absent; nothing to exercise.
        return Ok(());
    };

    let dir = tempfile::tempdir().map_err(|e| Failed::from(format!("tempdir: {e}")))?;
    let translator = write_script(
        dir.path(),
        "translator",
        "#!/bin/sh\necho 'translator unavailable' >&2\nexit 1\n",
    )?;
    let creduce = write_script(dir.path(), "creduce", "#!/bin/sh\nexit 0\n")?;

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crfuzz"));
    cmd.current_dir(dir.path())
        .arg("--csmith")
        .arg(&csmith)
        .arg("--cc")
        .arg(&gcc)
        .arg("--translator")
        .arg(&translator)
        .arg("--creduce")
        .arg(&creduce);
    if let Ok(home) = std::env::var("CSMITH_HOME") {
        cmd.arg("-I").arg(format!("{home}/runtime"));
    }

    let output = cmd
        .output()
        .map_err(|e| Failed::from(format!("run crfuzz: {e}")))?;
    let stdout = String::from_utf8_lossy(&output.stdout);

    match output.status.code() {
        // Discard somewhere on the reference path (e.g. csmith runtime
        // headers not installed); a clean exit with no report is correct.
        Some(0) => {
            if !stdout.is_empty() {
                return Err(Failed::from(format!("unexpected stdout: {stdout}")));
            }
            Ok(())
        }
        // The stub translator failed, which is a reportable divergence.
        Some(1) => {
            if stdout.starts_with("translating to Rust failed:") {
                Ok(())
            } else {
                Err(Failed::from(format!("unexpected divergence: {stdout}")))
            }
        }
        code => Err(Failed::from(format!("unexpected exit code {code:?}"))),
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf, Failed> {
    let path = dir.join(name);
    fs::write(&path, body).map_err(|e| Failed::from(format!("write {name}: {e}")))?;
    let mut perms = fs::metadata(&path)
        .map_err(|e| Failed::from(format!("stat {name}: {e}")))?
        .permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).map_err(|e| Failed::from(format!("chmod {name}: {e}")))?;
    Ok(path)
}

/// Find an executable in `PATH`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .filter_map(|dir| {
                let full_path = dir.join(name);
                if full_path.is_file() {
                    Some(full_path)
                } else {
                    None
                }
            })
            .next()
    })
}
