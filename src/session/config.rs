//! Per-session configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default shell the transport drives.
pub const DEFAULT_SHELL: &str = "powershell.exe";

/// Default path-translation helper.
pub const DEFAULT_PATH_TRANSLATOR: &str = "wslpath";

/// Default PowerShell configuration endpoint.
pub const DEFAULT_CONFIGURATION_NAME: &str = "Microsoft.PowerShell";

/// Default per-operation timeout.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Where commands run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The local shell, addressed as `addr` for logging.
    Local { addr: String },
    /// A Hyper-V guest reached through a remote-session script.
    VirtualMachine { name: String },
}

impl Target {
    /// Whether commands are wrapped in a remote-session script.
    pub fn is_virtual_machine(&self) -> bool {
        matches!(self, Target::VirtualMachine { .. })
    }
}

/// Session configuration, fixed for the life of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Host name or address of the managed node.
    pub remote_addr: String,
    /// Hyper-V guest name. Selects the virtual-machine target when set.
    pub vm_name: Option<String>,
    /// User to log in as.
    pub remote_user: Option<String>,
    /// Password for `remote_user`; only used for a virtual-machine target.
    pub remote_password: Option<String>,
    /// Working directory for spawned children.
    pub working_dir: Option<PathBuf>,
    /// Whether module input is pipelined over stdin.
    pub pipelining: bool,
    /// Per-operation timeout. Carried for the caller; not enforced here.
    pub operation_timeout: Duration,
    /// PowerShell configuration endpoint. Carried for the caller.
    pub configuration_name: String,
    /// Shell executable name or path.
    pub shell: String,
    /// Path-translation helper; `None` keeps paths unchanged.
    pub path_translator: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            remote_addr: "localhost".to_string(),
            vm_name: None,
            remote_user: None,
            remote_password: None,
            working_dir: None,
            pipelining: false,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            configuration_name: DEFAULT_CONFIGURATION_NAME.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            path_translator: Some(DEFAULT_PATH_TRANSLATOR.to_string()),
        }
    }
}

impl SessionConfig {
    /// Create a config for the local shell.
    pub fn local() -> Self {
        Self::default()
    }

    /// Create a config for the Hyper-V guest `name`.
    pub fn virtual_machine(name: impl Into<String>) -> Self {
        Self {
            vm_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the guest credentials.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.remote_user = Some(user.into());
        self.remote_password = Some(password.into());
        self
    }

    /// Set the shell executable.
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the path translator; `None` disables translation.
    pub fn path_translator(mut self, translator: Option<String>) -> Self {
        self.path_translator = translator;
        self
    }

    /// Enable or disable pipelining.
    pub fn pipelining(mut self, enabled: bool) -> Self {
        self.pipelining = enabled;
        self
    }

    /// The single target this configuration selects.
    ///
    /// An empty `vm_name` counts as unset.
    pub fn target(&self) -> Target {
        match self.vm_name.as_deref() {
            Some(name) if !name.is_empty() => Target::VirtualMachine {
                name: name.to_string(),
            },
            _ => Target::Local {
                addr: self.remote_addr.clone(),
            },
        }
    }

    /// User name, or empty when unset.
    pub fn user(&self) -> &str {
        self.remote_user.as_deref().unwrap_or_default()
    }

    /// Password, or empty when unset.
    pub fn password(&self) -> &str {
        self.remote_password.as_deref().unwrap_or_default()
    }
}
