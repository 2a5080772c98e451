//! The spawn-and-wait primitive.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use super::pty::{self, PtyPair};
use super::result::ProcessResult;

/// What the child's stdin is connected to.
#[derive(Debug, Default)]
pub enum StdinChannel {
    /// `/dev/null`.
    Null,
    /// An anonymous pipe fed from the parent.
    #[default]
    Pipe,
    /// The slave half of a pty; the parent writes to the master.
    Pty(PtyPair),
}

/// One child process to spawn.
#[derive(Debug)]
pub struct Invocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, excluding the program itself.
    pub args: Vec<OsString>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Stdin wiring.
    pub stdin: StdinChannel,
    /// Bytes written to the child's input before waiting.
    pub input: Option<Vec<u8>>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments and a piped stdin.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stdin: StdinChannel::Pipe,
            input: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the stdin channel.
    pub fn stdin(mut self, stdin: StdinChannel) -> Self {
        self.stdin = stdin;
        self
    }

    /// Set the input bytes.
    pub fn input(mut self, input: Option<Vec<u8>>) -> Self {
        self.input = input;
        self
    }

    /// Whether stdin is attached to a pty.
    pub fn uses_pty(&self) -> bool {
        matches!(self.stdin, StdinChannel::Pty(_))
    }
}

/// Spawns children and waits for them.
///
/// Every process the transport starts goes through this trait, which is
/// also what lets tests observe spawns without running a real shell.
pub trait ProcessRunner: Send + Sync {
    /// Spawn one child, feed it `invocation.input`, and block until it exits.
    fn run(&self, invocation: Invocation) -> io::Result<ProcessResult>;

    /// Allocate a pty pair for a child's stdin.
    fn open_pty(&self) -> io::Result<PtyPair> {
        pty::open()
    }
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: Invocation) -> io::Result<ProcessResult> {
        let Invocation {
            program,
            args,
            working_dir,
            stdin,
            input,
        } = invocation;

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &working_dir {
            command.current_dir(dir);
        }

        #[allow(unused_mut)]
        let mut master: Option<std::fs::File> = None;
        match stdin {
            StdinChannel::Null => {
                command.stdin(Stdio::null());
            }
            StdinChannel::Pipe => {
                command.stdin(Stdio::piped());
            }
            #[cfg(unix)]
            StdinChannel::Pty(pair) => {
                command.stdin(Stdio::from(pair.slave));
                master = Some(std::fs::File::from(pair.master));
            }
            #[cfg(not(unix))]
            StdinChannel::Pty(_) => {
                command.stdin(Stdio::piped());
            }
        }

        debug!(program = %program.display(), "spawning child");
        let mut child = command.spawn()?;

        // The slave half now belongs to the child. Closing the parent's copy
        // keeps the master from waiting on a reader that never goes away.
        drop(command);

        if let Some(mut master) = master {
            // The master stays open until the child is gone; the writer only
            // borrows it.
            let writer = &mut master;
            let output = std::thread::scope(|scope| {
                if let Some(input) = input.as_deref() {
                    scope.spawn(move || write_input(writer, input));
                }
                child.wait_with_output()
            });
            drop(master);
            return output.map(ProcessResult::from);
        }

        let child_stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            if let Some(mut child_stdin) = child_stdin {
                scope.spawn(move || {
                    if let Some(input) = input.as_deref() {
                        write_input(&mut child_stdin, input);
                    }
                    // Dropping the handle closes the pipe so the child sees EOF.
                });
            }
            child.wait_with_output()
        })?;

        Ok(ProcessResult::from(output))
    }
}

fn write_input(writer: &mut impl Write, input: &[u8]) {
    if let Err(e) = writer.write_all(input).and_then(|_| writer.flush()) {
        // The child may exit without reading its input.
        if e.kind() != io::ErrorKind::BrokenPipe {
            debug!(error = %e, "failed to write child input");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("true")
            .working_dir(Some(PathBuf::from("/tmp")))
            .input(Some(b"data".to_vec()));

        assert_eq!(inv.program, PathBuf::from("sh"));
        assert_eq!(inv.args, vec![OsString::from("-c"), OsString::from("true")]);
        assert_eq!(inv.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(inv.input.as_deref(), Some(&b"data"[..]));
        assert!(!inv.uses_pty());
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_captures_output() {
        let inv = Invocation::new("sh").arg("-c").arg("echo out; echo err >&2; exit 3");
        let result = SystemRunner::new().run(inv).unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, b"out\n");
        assert_eq!(result.stderr, b"err\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_feeds_input() {
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("cat")
            .input(Some(b"piped input".to_vec()));
        let result = SystemRunner::new().run(inv).unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, b"piped input");
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_closes_stdin_without_input() {
        // `cat` would block forever if stdin stayed open.
        let inv = Invocation::new("sh").arg("-c").arg("cat");
        let result = SystemRunner::new().run(inv).unwrap();

        assert!(result.success());
        assert!(result.stdout.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("pwd")
            .working_dir(Some(dir.path().to_path_buf()));
        let result = SystemRunner::new().run(inv).unwrap();

        let printed = PathBuf::from(result.stdout_lossy().trim_end());
        assert_eq!(
            printed.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_with_pty_stdin() {
        let Ok(pair) = SystemRunner::new().open_pty() else {
            return;
        };
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("test -t 0 && echo tty")
            .stdin(StdinChannel::Pty(pair));
        assert!(inv.uses_pty());

        let result = SystemRunner::new().run(inv).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, b"tty\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_pty_input_while_output_drains() {
        let Ok(pair) = SystemRunner::new().open_pty() else {
            return;
        };
        // More output than a pipe holds is written before any input is read.
        let input: Vec<u8> = (0..2000)
            .flat_map(|i| format!("module argument line {i:04} padded out\n").into_bytes())
            .collect();
        assert!(input.len() > 64 * 1024);

        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("head -c 200000 /dev/zero; head -n 2000 >/dev/null; echo done")
            .stdin(StdinChannel::Pty(pair))
            .input(Some(input));
        let result = SystemRunner::new().run(inv).unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.len(), 200_000 + "done\n".len());
        assert!(result.stdout.ends_with(b"done\n"));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let inv = Invocation::new("definitely-not-a-real-program-wsl2");
        let err = SystemRunner::new().run(inv).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
