//! Child process plumbing.
//!
//! This module provides the single spawn-and-wait primitive the transport
//! is built on:
//! - [`ProcessRunner`] and its std-backed [`SystemRunner`]
//! - pty allocation for the child's stdin
//! - shell executable discovery
//!
//! # Example
//!
//! ```no_run
//! use wsl2_transport::process::{Invocation, ProcessRunner, SystemRunner};
//!
//! let result = SystemRunner::new()
//!     .run(Invocation::new("sh").arg("-c").arg("echo hello"))
//!     .unwrap();
//! println!("exit {}: {}", result.exit_code, result.stdout_lossy());
//! ```

mod locate;
pub mod pty;
mod recording;
mod result;
mod runner;

pub use locate::resolve_executable;
pub use pty::PtyPair;
pub use recording::{RecordedInvocation, RecordingRunner};
pub use result::ProcessResult;
pub use runner::{Invocation, ProcessRunner, StdinChannel, SystemRunner};
