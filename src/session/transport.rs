//! The transport session.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info_span, trace, warn, Span};

use super::config::{SessionConfig, Target};
use super::state::ConnectionState;
use crate::error::TransportError;
use crate::escalation::Become;
use crate::process::{
    resolve_executable, Invocation, ProcessResult, ProcessRunner, StdinChannel, SystemRunner,
};
use crate::script::{self, ScriptParams};
use crate::transfer::{self, TransferRequest};
use crate::Result;

/// Flag that makes the shell run its next argument as a command.
pub const COMMAND_FLAG: &str = "-c";

/// One logical connection to a target.
///
/// Each operation spawns at most one shell child and waits for it.
/// A session is not meant to be shared between concurrent callers; wrap it
/// in [`AsyncSession`](super::AsyncSession) for that.
pub struct TransportSession {
    config: SessionConfig,
    state: ConnectionState,
    runner: Arc<dyn ProcessRunner>,
    become_method: Option<Box<dyn Become>>,
    span: Span,
}

impl TransportSession {
    /// Create a session that spawns real processes.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner::new()))
    }

    /// Create a session that spawns through `runner`.
    pub fn with_runner(config: SessionConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let span = info_span!("wsl2", host = %config.remote_addr);
        Self {
            config,
            state: ConnectionState::Disconnected,
            runner,
            become_method: None,
            span,
        }
    }

    /// Attach a privilege-escalation handler.
    pub fn with_become(mut self, become_method: impl Become + 'static) -> Self {
        self.become_method = Some(Box::new(become_method));
        self
    }

    /// Log every operation of this session inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether `connect` has been called without a matching `close`.
    pub fn is_connected(&self) -> bool {
        self.state.can_execute()
    }

    /// Transport identifier.
    pub fn transport(&self) -> &'static str {
        super::capabilities().transport
    }

    /// Mark the session connected. No process is started; a missing shell is
    /// only reported by the first command.
    pub fn connect(&mut self) -> &mut Self {
        let span = self.span.clone();
        let _enter = span.enter();
        if self.state.connect() {
            debug!(
                user = self.config.user(),
                addr = %self.config.remote_addr,
                "ESTABLISH LOCAL CONNECTION FOR USER: {}",
                self.config.user()
            );
        }
        self
    }

    /// Mark the session disconnected.
    pub fn close(&mut self) {
        let _enter = self.span.enter();
        if self.state.close() {
            debug!("connection closed");
        }
    }

    /// Run `command` in the shell, or inside the guest for a
    /// virtual-machine target.
    ///
    /// `input` is written to the child's stdin before waiting. When
    /// `sudoable` is set and the become handler expects a prompt (and
    /// pipelining is off), stdin is a pty if one can be allocated.
    pub fn exec_command(
        &self,
        command: impl AsRef<[u8]>,
        input: Option<&[u8]>,
        sudoable: bool,
    ) -> Result<ProcessResult> {
        let _enter = self.span.enter();
        self.ensure_connected()?;

        let command = command.as_ref();
        let command_text = String::from_utf8_lossy(command);
        if command_text.trim().is_empty() {
            return Err(TransportError::EmptyCommand);
        }

        trace!(command = %command_text, "CMD");
        if let Some(input) = input {
            trace!(input = %String::from_utf8_lossy(input), "IN");
        }

        let executable = resolve_executable(&self.config.shell)?;
        debug!(exe = %executable.display(), "EXEC {}", command_text);

        let stdin = self.stdin_channel(sudoable);

        let argument = match self.config.target() {
            Target::VirtualMachine { name } => {
                debug!(vm = %name, "wrapping command in remote session");
                let script = script::enter_vm(&ScriptParams {
                    target: &name,
                    user: self.config.user(),
                    password: self.config.password(),
                    payload: &command_text,
                });
                trace!(script = %script, "remote session script");
                OsString::from(script)
            }
            Target::Local { .. } => os_string_from_bytes(command),
        };

        let invocation = Invocation::new(executable)
            .arg(COMMAND_FLAG)
            .arg(argument)
            .working_dir(self.config.working_dir.clone())
            .stdin(stdin)
            .input(input.map(<[u8]>::to_vec));

        let result = self.spawn("exec_command", invocation)?;
        trace!(stdout = %result.stdout_lossy(), stderr = %result.stderr_lossy(), "output");
        debug!(exit_code = result.exit_code, "command finished");

        Ok(result)
    }

    /// Copy `source` on the controller to `destination` on the target.
    pub fn put_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        self.transfer(&TransferRequest::upload(
            source.as_ref(),
            destination.as_ref(),
        ))
    }

    /// Copy `source` to `destination`. Fetching uses the same mechanism as
    /// [`put_file`](Self::put_file) with the same argument order.
    pub fn fetch_file(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
    ) -> Result<()> {
        self.transfer(&TransferRequest::download(
            source.as_ref(),
            destination.as_ref(),
        ))
    }

    /// Carry out one transfer request.
    pub fn transfer(&self, request: &TransferRequest) -> Result<()> {
        let _enter = self.span.enter();
        self.ensure_connected()?;

        if !request.source.exists() {
            return Err(TransportError::SourceNotFound {
                path: request.source.clone(),
            });
        }

        let translated = transfer::translate_path(
            self.runner.as_ref(),
            self.config.path_translator.as_deref(),
            &request.source,
        )?;

        debug!(
            "{} {} TO {}",
            request.direction,
            translated,
            request.destination.display()
        );

        match self.config.target() {
            Target::VirtualMachine { name } => {
                let destination = request.destination.to_string_lossy();
                let script = script::copy_file(
                    &ScriptParams {
                        target: &name,
                        user: self.config.user(),
                        password: self.config.password(),
                        payload: &translated,
                    },
                    &destination,
                );
                trace!(script = %script, "remote copy script");

                let executable = resolve_executable(&self.config.shell)?;
                let invocation = Invocation::new(executable)
                    .arg(COMMAND_FLAG)
                    .arg(script)
                    .working_dir(self.config.working_dir.clone())
                    .stdin(StdinChannel::Null);

                let result = self.spawn("put_file", invocation)?;
                trace!(stdout = %result.stdout_lossy(), stderr = %result.stderr_lossy(), "output");
                if !result.success() {
                    warn!(
                        exit_code = result.exit_code,
                        vm = %name,
                        "remote copy exited with non-zero status"
                    );
                }
                Ok(())
            }
            Target::Local { .. } => transfer::copy_local(&request.source, &request.destination),
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.state.can_execute() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn wants_pty(&self, sudoable: bool) -> bool {
        sudoable
            && !self.config.pipelining
            && self
                .become_method
                .as_ref()
                .is_some_and(|b| b.expects_prompt())
    }

    fn stdin_channel(&self, sudoable: bool) -> StdinChannel {
        if !self.wants_pty(sudoable) {
            return StdinChannel::Pipe;
        }
        match self.runner.open_pty() {
            Ok(pair) => StdinChannel::Pty(pair),
            Err(e) => {
                // A pipe still works for most escalation methods.
                debug!(error = %TransportError::PtyAllocation(e), "falling back to pipe");
                StdinChannel::Pipe
            }
        }
    }

    fn spawn(&self, operation: &'static str, invocation: Invocation) -> Result<ProcessResult> {
        let program = invocation.program.clone();
        self.runner
            .run(invocation)
            .map_err(|source| TransportError::Spawn {
                operation,
                program,
                source,
            })
    }
}

impl std::fmt::Debug for TransportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("target", &self.config.target())
            .field("state", &self.state)
            .field("become", &self.become_method)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes.to_vec())
}

#[cfg(not(unix))]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}
