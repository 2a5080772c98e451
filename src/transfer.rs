//! File transfer helpers: requests, path translation, and the local copy.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TransportError;
use crate::process::{Invocation, ProcessRunner, StdinChannel};
use crate::Result;

/// Transfer direction. Both directions use the same copy mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Controller to target.
    Upload,
    /// Target to controller.
    Download,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upload => f.write_str("PUT"),
            Direction::Download => f.write_str("FETCH"),
        }
    }
}

/// A single file transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub direction: Direction,
}

impl TransferRequest {
    /// Controller to target.
    pub fn upload(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            direction: Direction::Upload,
        }
    }

    /// Target to controller.
    pub fn download(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            direction: Direction::Download,
        }
    }
}

/// Translate `path` with `<translator> -w <path>` and return its stdout
/// without the trailing line ending.
///
/// With no translator configured the path is returned unchanged.
pub fn translate_path(
    runner: &dyn ProcessRunner,
    translator: Option<&str>,
    path: &Path,
) -> Result<String> {
    let Some(translator) = translator else {
        return Ok(path.to_string_lossy().into_owned());
    };

    let invocation = Invocation::new(translator)
        .arg("-w")
        .arg(path.as_os_str())
        .stdin(StdinChannel::Null);

    let result = runner.run(invocation).map_err(|e| TransportError::PathTranslation {
        path: path.to_path_buf(),
        reason: format!("{translator}: {e}"),
    })?;

    if !result.success() {
        return Err(TransportError::PathTranslation {
            path: path.to_path_buf(),
            reason: format!(
                "{translator} exited with {}: {}",
                result.exit_code,
                result.stderr_lossy().trim()
            ),
        });
    }

    let translated = trim_line_ending(&result.stdout_lossy()).to_string();
    debug!(from = %path.display(), to = %translated, "translated path");
    Ok(translated)
}

fn trim_line_ending(s: &str) -> &str {
    s.trim_end_matches(&['\r', '\n'][..])
}

/// Copy `source` to `destination` byte for byte.
///
/// Only file contents are copied, not permissions. Fails with
/// [`TransportError::SameFile`] when both paths name the same file.
pub fn copy_local(source: &Path, destination: &Path) -> Result<()> {
    if same_file(source, destination) {
        return Err(TransportError::SameFile {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
        });
    }

    let io_err = |e: io::Error| TransportError::TransferIo {
        destination: destination.to_path_buf(),
        source: e,
    };

    let mut reader = File::open(source).map_err(io_err)?;
    let mut writer = File::create(destination).map_err(io_err)?;
    io::copy(&mut reader, &mut writer).map_err(io_err)?;
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
