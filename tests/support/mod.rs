#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn data_dir() -> PathBuf {
    repo_root().join("data")
}

pub fn slurp_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_slurp-prefixmaps"))
}

pub fn validate_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_prefixmaps-validate"))
}

// Runs the command and fails with its stderr when it exits non-zero.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to spawn {:?}", cmd.get_program()))?;
    if !output.status.success() {
        bail!(
            "{:?} exited with {:?}: {}",
            cmd.get_program(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}
