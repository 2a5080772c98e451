//! Executable discovery.

use std::path::PathBuf;

use tracing::debug;

use crate::error::TransportError;
use crate::Result;

/// Resolve `name` to an executable path.
///
/// Searches `PATH` first and falls back to the literal name. The result
/// must exist on disk, otherwise [`TransportError::ExecutableNotFound`].
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    let executable = which::which(name).unwrap_or_else(|_| PathBuf::from(name));
    debug!(shell = %executable.display(), "resolved shell");

    if !executable.exists() {
        return Err(TransportError::ExecutableNotFound { executable });
    }
    Ok(executable)
}
