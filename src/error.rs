//! Error types for wsl2-transport.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The configured shell could not be found on `PATH` or at its literal path.
    #[error(
        "failed to find the executable specified {}. Please verify if the executable exists and re-try.",
        executable.display()
    )]
    ExecutableNotFound { executable: PathBuf },

    /// The command was empty after normalization.
    #[error("command is empty")]
    EmptyCommand,

    /// An operation was attempted before `connect`.
    #[error("transport is not connected")]
    NotConnected,

    /// Transfer source does not exist.
    #[error("file or module does not exist: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Source and destination of a copy are the same file.
    #[error("failed to copy: {} and {} are the same", from.display(), to.display())]
    SameFile { from: PathBuf, to: PathBuf },

    /// Local copy failed.
    #[error("failed to transfer file to {}: {source}", destination.display())]
    TransferIo {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path-translation helper failed.
    #[error("failed to translate path {}: {reason}", path.display())]
    PathTranslation { path: PathBuf, reason: String },

    /// Spawning or waiting on a child process failed.
    #[error("{operation}: failed to run {}: {source}", program.display())]
    Spawn {
        operation: &'static str,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking operation panicked or was cancelled on the runtime.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Pseudo-terminal allocation failed. Logged and degraded to a pipe;
    /// never returned from a public operation.
    #[error("unable to open pty: {0}")]
    PtyAllocation(#[source] std::io::Error),
}

/// Convenience Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_not_found_display() {
        let err = TransportError::ExecutableNotFound {
            executable: PathBuf::from("powershell.exe"),
        };
        assert!(err.to_string().contains("powershell.exe"));
        assert!(err.to_string().contains("failed to find the executable"));
    }

    #[test]
    fn test_source_not_found_display() {
        let err = TransportError::SourceNotFound {
            path: PathBuf::from("/tmp/missing"),
        };
        assert!(err.to_string().contains("/tmp/missing"));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_same_file_display() {
        let err = TransportError::SameFile {
            from: PathBuf::from("/a"),
            to: PathBuf::from("/a"),
        };
        assert_eq!(err.to_string(), "failed to copy: /a and /a are the same");
    }

    #[test]
    fn test_transfer_io_keeps_cause() {
        use std::error::Error as _;

        let err = TransportError::TransferIo {
            destination: PathBuf::from("/readonly/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/readonly/out"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_spawn_display_names_operation() {
        let err = TransportError::Spawn {
            operation: "exec_command",
            program: PathBuf::from("sh"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let text = err.to_string();
        assert!(text.starts_with("exec_command"));
        assert!(text.contains("sh"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: TransportError = io_err.into();
        assert!(matches!(err, TransportError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_not_connected_display() {
        assert!(TransportError::NotConnected
            .to_string()
            .contains("not connected"));
    }
}
