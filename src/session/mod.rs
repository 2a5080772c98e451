//! Transport sessions.
//!
//! A [`TransportSession`] is one logical connection to a target: the local
//! shell, or a Hyper-V guest reached through a PowerShell remote session.
//! [`AsyncSession`] wraps one for use from async code.

mod async_session;
mod capabilities;
mod config;
mod state;
mod transport;

pub use async_session::AsyncSession;
pub use capabilities::{capabilities, Capabilities};
pub use config::{
    SessionConfig, Target, DEFAULT_CONFIGURATION_NAME, DEFAULT_OPERATION_TIMEOUT,
    DEFAULT_PATH_TRANSLATOR, DEFAULT_SHELL,
};
pub use state::ConnectionState;
pub use transport::{TransportSession, COMMAND_FLAG};
