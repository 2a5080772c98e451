//! Configuration management for wsl2-transport.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::escalation::PromptBased;
use crate::session::{
    SessionConfig, TransportSession, DEFAULT_CONFIGURATION_NAME, DEFAULT_OPERATION_TIMEOUT,
    DEFAULT_PATH_TRANSLATOR, DEFAULT_SHELL,
};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection configuration.
    pub connection: ConnectionSection,
    /// Privilege escalation configuration.
    #[serde(rename = "become")]
    pub escalation: BecomeSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Connection configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// Host name or address of the managed node.
    pub remote_addr: String,
    /// Hyper-V guest name; selects the remote-session target.
    pub vm_name: Option<String>,
    /// User to log in as.
    pub remote_user: Option<String>,
    /// Password for the user.
    pub remote_password: Option<String>,
    /// Working directory for spawned children.
    pub working_dir: Option<PathBuf>,
    /// Pipeline module input over stdin.
    pub pipelining: bool,
    /// Per-operation timeout in seconds.
    pub operation_timeout: u64,
    /// PowerShell configuration endpoint.
    pub configuration_name: String,
    /// Shell executable.
    pub shell: String,
    /// Path-translation helper; `null` disables translation.
    pub path_translator: Option<String>,
}

impl Default for ConnectionSection {
    fn default() -> Self {
        Self {
            remote_addr: "localhost".to_string(),
            vm_name: None,
            remote_user: None,
            remote_password: None,
            working_dir: None,
            pipelining: false,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT.as_secs(),
            configuration_name: DEFAULT_CONFIGURATION_NAME.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            path_translator: Some(DEFAULT_PATH_TRANSLATOR.to_string()),
        }
    }
}

/// Privilege escalation section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BecomeSection {
    /// Escalation method name (e.g. `runas`).
    pub method: Option<String>,
    /// Prompt the escalated command prints; empty means no prompt.
    pub prompt: String,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let conn = &mut self.connection;

        if let Some(addr) = lookup("WSL2_REMOTE_ADDR") {
            conn.remote_addr = addr;
        }
        if let Some(vm) = lookup("WSL2_VM_NAME") {
            conn.vm_name = Some(vm).filter(|v| !v.is_empty());
        }
        if let Some(user) = lookup("WSL2_USER") {
            conn.remote_user = Some(user);
        }
        if let Some(password) = lookup("WSL2_PASSWORD") {
            conn.remote_password = Some(password);
        }
        if let Some(shell) = lookup("WSL2_SHELL") {
            conn.shell = shell;
        }
        if let Some(timeout) = lookup("WSL2_OPERATION_TIMEOUT") {
            if let Ok(timeout) = timeout.parse() {
                conn.operation_timeout = timeout;
            }
        }
        if let Some(name) = lookup("WSL2_CONFIGURATION_NAME") {
            conn.configuration_name = name;
        }
        if let Some(pipelining) = lookup("WSL2_PIPELINING") {
            conn.pipelining = matches!(
                pipelining.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Some(level) = lookup("WSL2_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        let conn = &mut self.connection;

        if let Some(ref host) = args.host {
            conn.remote_addr = host.clone();
        }
        if let Some(ref vm) = args.vm_name {
            conn.vm_name = Some(vm.clone());
        }
        if let Some(ref user) = args.user {
            conn.remote_user = Some(user.clone());
        }
        if let Some(ref password) = args.password {
            conn.remote_password = Some(password.clone());
        }
        if let Some(ref shell) = args.shell {
            conn.shell = shell.clone();
        }
        if let Some(ref cwd) = args.cwd {
            conn.working_dir = Some(cwd.clone());
        }
        if args.pipelining {
            conn.pipelining = true;
        }
        if args.no_path_translation {
            conn.path_translator = None;
        }

        if let Some(ref method) = args.become_method {
            self.escalation.method = Some(method.clone());
        }
        if let Some(ref prompt) = args.become_prompt {
            self.escalation.prompt = prompt.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to a [`SessionConfig`].
    pub fn to_session_config(&self) -> SessionConfig {
        let conn = &self.connection;
        SessionConfig {
            remote_addr: conn.remote_addr.clone(),
            vm_name: conn.vm_name.clone(),
            remote_user: conn.remote_user.clone(),
            remote_password: conn.remote_password.clone(),
            working_dir: conn.working_dir.clone(),
            pipelining: conn.pipelining,
            operation_timeout: Duration::from_secs(conn.operation_timeout),
            configuration_name: conn.configuration_name.clone(),
            shell: conn.shell.clone(),
            path_translator: conn.path_translator.clone(),
        }
    }

    /// Build a session that spawns real processes.
    pub fn build_session(&self) -> TransportSession {
        let session = TransportSession::new(self.to_session_config());
        match self.escalation.method {
            Some(ref method) => session.with_become(PromptBased::new(
                method.clone(),
                self.escalation.prompt.clone(),
            )),
            None => session,
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
