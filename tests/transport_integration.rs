//! Transport integration tests.
//!
//! These run real children through `/bin/sh` standing in for PowerShell,
//! so they only build on Unix.

#![cfg(unix)]

use std::sync::Arc;

use wsl2_transport::process::RecordingRunner;
use wsl2_transport::{PromptBased, SessionConfig, TransportError, TransportSession};

fn sh_session(config: SessionConfig) -> TransportSession {
    let mut session = TransportSession::new(config.shell("sh").path_translator(None));
    session.connect();
    session
}

// ============================================================================
// Command Execution Tests
// ============================================================================

#[test]
fn test_echo_hi() {
    let session = sh_session(SessionConfig::local());

    let (code, stdout, stderr) = session
        .exec_command("echo hi", None, false)
        .unwrap()
        .into_parts();

    assert_eq!(code, 0);
    assert_eq!(stdout, b"hi\n");
    assert_eq!(stderr, b"");
}

#[test]
fn test_exit_code_and_stderr() {
    let session = sh_session(SessionConfig::local());

    let result = session
        .exec_command("echo oops >&2; exit 4", None, false)
        .unwrap();

    assert_eq!(result.exit_code, 4);
    assert!(result.stdout.is_empty());
    assert_eq!(result.stderr, b"oops\n");
}

#[test]
fn test_input_reaches_child() {
    let session = sh_session(SessionConfig::local());

    let result = session
        .exec_command("tr a-z A-Z", Some(b"module args"), false)
        .unwrap();

    assert!(result.success());
    assert_eq!(result.stdout, b"MODULE ARGS");
}

#[test]
fn test_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "").unwrap();
    let session = sh_session(SessionConfig::local().working_dir(dir.path()));

    let result = session.exec_command("ls", None, false).unwrap();
    assert!(result.stdout_lossy().contains("marker.txt"));
}

#[test]
fn test_escalation_stdin_is_tty_or_pipe() {
    let mut session = TransportSession::new(
        SessionConfig::local()
            .shell("sh")
            .path_translator(None),
    )
    .with_become(PromptBased::new("sudo", "[sudo] password:"));
    session.connect();

    // A pty is used when the host has one to give; either way the call succeeds.
    let result = session
        .exec_command("if [ -t 0 ]; then echo tty; else echo pipe; fi", None, true)
        .unwrap();

    assert!(result.success());
    let out = result.stdout_lossy();
    assert!(out == "tty\n" || out == "pipe\n", "unexpected output {out:?}");
}

#[test]
fn test_escalation_with_large_input() {
    let mut session = TransportSession::new(
        SessionConfig::local()
            .shell("sh")
            .path_translator(None),
    )
    .with_become(PromptBased::new("sudo", "[sudo] password:"));
    session.connect();

    let input: Vec<u8> = (0..2000)
        .flat_map(|i| format!("{{\"ANSIBLE_MODULE_ARGS\": {{\"line\": {i:05}}}}}\n").into_bytes())
        .collect();
    let result = session
        .exec_command(
            "head -c 200000 /dev/zero; head -n 2000 >/dev/null; echo done",
            Some(&input),
            true,
        )
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout.len(), 200_005);
    assert!(result.stdout.ends_with(b"done\n"));
}

#[test]
fn test_pty_failure_still_returns_result() {
    let runner = RecordingRunner::new().without_pty();
    let shell = std::env::current_exe().unwrap();
    let mut session = TransportSession::with_runner(
        SessionConfig::local().shell(shell.to_string_lossy()),
        Arc::new(runner.clone()),
    )
    .with_become(PromptBased::new("sudo", "[sudo] password:"));
    session.connect();

    let result = session.exec_command("id", None, true).unwrap();
    assert_eq!(result.exit_code, 0);
    assert!(!runner.calls()[0].used_pty);
}

#[test]
fn test_missing_shell() {
    let session = sh_session(SessionConfig::local().shell("no-such-powershell-wsl2.exe"));

    let err = session.exec_command("echo hi", None, false).unwrap_err();
    assert!(matches!(err, TransportError::ExecutableNotFound { .. }));
}

#[test]
fn test_exec_before_connect() {
    let session = TransportSession::new(SessionConfig::local().shell("sh"));
    assert!(matches!(
        session.exec_command("echo hi", None, false),
        Err(TransportError::NotConnected)
    ));
}

// ============================================================================
// File Transfer Tests
// ============================================================================

#[test]
fn test_put_file_copies_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("module.ps1");
    let dst = dir.path().join("remote.ps1");
    std::fs::write(&src, b"\xEF\xBB\xBFWrite-Output 'x'\r\n").unwrap();

    let session = sh_session(SessionConfig::local());
    session.put_file(&src, &dst).unwrap();

    assert_eq!(
        std::fs::read(&dst).unwrap(),
        b"\xEF\xBB\xBFWrite-Output 'x'\r\n"
    );
}

#[test]
fn test_fetch_file_is_put_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("result.json");
    std::fs::write(&src, "{}").unwrap();

    let session = sh_session(SessionConfig::local());
    session.fetch_file(&src, dir.path().join("a.json")).unwrap();
    session.put_file(&src, dir.path().join("b.json")).unwrap();

    assert_eq!(
        std::fs::read(dir.path().join("a.json")).unwrap(),
        std::fs::read(dir.path().join("b.json")).unwrap()
    );
}

#[test]
fn test_put_missing_source() {
    let session = sh_session(SessionConfig::local());

    let err = session.put_file("/tmp/missing", "/tmp/elsewhere").unwrap_err();
    match err {
        TransportError::SourceNotFound { path } => assert_eq!(path.to_str(), Some("/tmp/missing")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_put_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("same.txt");
    std::fs::write(&src, "keep").unwrap();

    let session = sh_session(SessionConfig::local());
    let err = session.put_file(&src, &src).unwrap_err();

    assert!(matches!(err, TransportError::SameFile { .. }));
    assert_eq!(std::fs::read_to_string(&src).unwrap(), "keep");
}

#[test]
fn test_put_same_file_through_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("real.txt");
    let link = dir.path().join("link.txt");
    std::fs::write(&src, "keep").unwrap();
    std::os::unix::fs::symlink(&src, &link).unwrap();

    let session = sh_session(SessionConfig::local());
    assert!(matches!(
        session.put_file(&src, &link),
        Err(TransportError::SameFile { .. })
    ));
}
