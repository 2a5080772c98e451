//! Recording runner for testing transports without spawning processes.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::pty::PtyPair;
use super::result::ProcessResult;
use super::runner::{Invocation, ProcessRunner};

/// What a [`RecordingRunner`] saw for one spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: Option<PathBuf>,
    pub used_pty: bool,
    pub input: Option<Vec<u8>>,
}

impl RecordedInvocation {
    /// Arguments decoded lossily, for assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Whether this is a `<translator> -w <path>` call.
    pub fn is_path_translation(&self) -> bool {
        self.args.len() == 2 && self.args[0] == "-w"
    }
}

type Responder = dyn Fn(&RecordedInvocation) -> io::Result<ProcessResult> + Send + Sync;

/// A [`ProcessRunner`] that records invocations instead of running them.
///
/// Path-translation calls echo their path argument back with a trailing
/// newline; every other call answers with the configured result.
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<RecordedInvocation>>>,
    responder: Arc<Responder>,
    pty_available: bool,
}

impl RecordingRunner {
    /// Answer every command with exit code 0 and empty output.
    pub fn new() -> Self {
        Self::with_result(ProcessResult::default())
    }

    /// Answer every command with `result`.
    pub fn with_result(result: ProcessResult) -> Self {
        Self::with_responder(move |_| Ok(result.clone()))
    }

    /// Answer every command through `responder`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&RecordedInvocation) -> io::Result<ProcessResult> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
            pty_available: true,
        }
    }

    /// Make every pty allocation fail.
    pub fn without_pty(mut self) -> Self {
        self.pty_available = false;
        self
    }

    /// All invocations seen so far.
    pub fn calls(&self) -> Vec<RecordedInvocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of invocations seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordingRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingRunner")
            .field("calls", &self.call_count())
            .field("pty_available", &self.pty_available)
            .finish()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, invocation: Invocation) -> io::Result<ProcessResult> {
        let recorded = RecordedInvocation {
            used_pty: invocation.uses_pty(),
            program: invocation.program,
            args: invocation.args,
            working_dir: invocation.working_dir,
            input: invocation.input,
        };

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(recorded.clone());
        }

        if recorded.is_path_translation() {
            let mut stdout = recorded.args[1].to_string_lossy().into_owned().into_bytes();
            stdout.push(b'\n');
            return Ok(ProcessResult::new(0, stdout, Vec::new()));
        }

        (self.responder)(&recorded)
    }

    fn open_pty(&self) -> io::Result<PtyPair> {
        if !self.pty_available {
            return Err(io::Error::other("no pty devices left"));
        }
        super::pty::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_invocations() {
        let runner = RecordingRunner::with_result(ProcessResult::new(7, b"x".to_vec(), Vec::new()));
        let result = runner
            .run(Invocation::new("shell").arg("-c").arg("dir"))
            .unwrap();

        assert_eq!(result.exit_code, 7);
        assert_eq!(runner.call_count(), 1);
        assert_eq!(runner.calls()[0].args_lossy(), vec!["-c", "dir"]);
    }

    #[test]
    fn test_path_translation_echoes() {
        let runner = RecordingRunner::new();
        let result = runner
            .run(Invocation::new("wslpath").arg("-w").arg("/tmp/a"))
            .unwrap();

        assert_eq!(result.stdout, b"/tmp/a\n");
        assert!(runner.calls()[0].is_path_translation());
    }

    #[test]
    fn test_without_pty() {
        let runner = RecordingRunner::new().without_pty();
        assert!(runner.open_pty().is_err());
    }
}
