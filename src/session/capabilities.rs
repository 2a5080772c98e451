//! Static facts a host needs to drive this transport.

/// What the transport supports and how modules should be shaped for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Transport identifier.
    pub transport: &'static str,
    /// Shell dialect commands are written in.
    pub shell_type: &'static str,
    /// Preferred module file suffixes, best first.
    pub module_suffixes: &'static [&'static str],
    /// Module input can be pipelined over stdin.
    pub has_pipelining: bool,
    /// Modules are always pipelined.
    pub always_pipeline_modules: bool,
    /// The caller may not override the shell executable per task.
    pub allow_executable: bool,
    /// Async tasks run natively in the target shell.
    pub has_native_async: bool,
}

/// Capabilities of the `wsl2` transport.
pub const fn capabilities() -> Capabilities {
    Capabilities {
        transport: "wsl2",
        shell_type: "powershell",
        module_suffixes: &[".ps1", ".exe", ""],
        has_pipelining: true,
        always_pipeline_modules: true,
        allow_executable: false,
        has_native_async: true,
    }
}
