//! # wsl2-transport
//!
//! Command and file transport for a WSL host or a Hyper-V guest, driven
//! through the Windows PowerShell binary.
//!
//! A [`TransportSession`] runs each command as one `powershell.exe -c`
//! child. When a virtual machine is configured the command is first wrapped
//! in a remote-session script that opens `New-PSSession -VMName` inside the
//! guest. File transfers translate the controller path with `wslpath -w`
//! and either copy locally or run a `Copy-Item -ToSession` script.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wsl2_transport::{SessionConfig, TransportSession};
//!
//! fn main() -> wsl2_transport::Result<()> {
//!     wsl2_transport::logging::try_init().ok();
//!
//!     let config = SessionConfig::virtual_machine("build-agent")
//!         .credentials("Administrator", "secret");
//!     let mut session = TransportSession::new(config);
//!     session.connect();
//!
//!     let result = session.exec_command("hostname", None, false)?;
//!     println!("{} -> {}", result.exit_code, result.stdout_lossy());
//!
//!     session.put_file("/tmp/module.ps1", r"C:\Temp\module.ps1")?;
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod escalation;
pub mod logging;
pub mod process;
pub mod script;
pub mod session;
pub mod transfer;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use escalation::{Become, NoEscalation, PromptBased};
pub use process::{ProcessResult, ProcessRunner, SystemRunner};
pub use session::{AsyncSession, ConnectionState, SessionConfig, Target, TransportSession};
pub use transfer::{Direction, TransferRequest};
