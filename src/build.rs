//! Build cache and compiler driver.
//!
//! Artifacts are content-addressed: the artifact file name embeds a SHA-256
//! digest of the generated source, so an unchanged formula maps to an
//! existing file and a changed formula maps to a fresh path. A cache hit
//! returns before touching the filesystem or the compiler, so each distinct
//! formula is compiled at most once.

use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::EvalError;

/// File name the generated source is written under inside the build
/// directory.
pub const SOURCE_FILE: &str = "formula.rs";

/// Where a unit's generated source and compiled artifact live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub build_dir: PathBuf,
    pub artifact: PathBuf,
}

/// Replace every maximal run of non-alphanumeric characters with a single
/// `_`, so any evaluation name is usable as a directory and file name.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Lowercase hex SHA-256 of the generated source. The cache key.
pub fn source_digest(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Derive the on-disk layout for a named unit and its generated source:
/// `<base>/<sanitized>/<sanitized>_<digest><DLL_SUFFIX>`.
pub fn layout_for(base: &Path, name: &str, source: &str) -> BuildLayout {
    let name = sanitize_name(name);
    let build_dir = base.join(&name);
    let artifact = build_dir.join(format!(
        "{}_{}{}",
        name,
        source_digest(source),
        env::consts::DLL_SUFFIX
    ));
    BuildLayout {
        build_dir,
        artifact,
    }
}

/// Shell used to drive the compiler on this host.
fn shell_for_host() -> Result<(&'static str, &'static str), EvalError> {
    match env::consts::OS {
        "linux" | "macos" | "freebsd" => Ok(("sh", "-c")),
        "windows" => Ok(("cmd", "/C")),
        other => Err(EvalError::unsupported_platform(other)),
    }
}

/// Compile `source` into the layout's artifact, unless caching allows the
/// existing artifact to stand.
///
/// On a rebuild the whole build directory is cleared first, so a stale
/// artifact for a superseded formula never survives next to the new one.
pub fn build_artifact(
    layout: &BuildLayout,
    source: &str,
    reuse_cached: bool,
) -> Result<(), EvalError> {
    if reuse_cached && layout.artifact.exists() {
        return Ok(());
    }

    let (shell, flag) = shell_for_host()?;

    let dir = layout.build_dir.display().to_string();
    match fs::remove_dir_all(&layout.build_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(EvalError::build_directory(&dir, e.to_string())),
    }
    fs::create_dir_all(&layout.build_dir)
        .map_err(|e| EvalError::build_directory(&dir, e.to_string()))?;
    fs::write(layout.build_dir.join(SOURCE_FILE), source)
        .map_err(|e| EvalError::build_directory(&dir, e.to_string()))?;

    let artifact_name = layout
        .artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let command_line = format!(
        "rustc --edition 2021 --crate-type cdylib -o {} {}",
        artifact_name, SOURCE_FILE
    );

    let output = Command::new(shell)
        .arg(flag)
        .arg(&command_line)
        .current_dir(&layout.build_dir)
        .output()
        .map_err(|e| EvalError::compiler_spawn(&command_line, e.to_string()))?;

    if !output.status.success() {
        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(EvalError::compile_failed(
            format!("rustc exited with {}", output.status),
            diagnostics,
        ));
    }

    Ok(())
}
