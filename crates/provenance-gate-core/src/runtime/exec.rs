// crates/provenance-gate-core/src/runtime/exec.rs
// ============================================================================
// Module: Provenance Gate System Executor
// Description: Shell-backed implementation of the command execution seam.
// Purpose: Run manifest and report commands with a caller-supplied timeout.
// Dependencies: crate::interfaces, std::process
// ============================================================================

//! ## Overview
//! [`SystemCommandExecutor`] runs commands through the platform shell,
//! capturing stdout and stderr on reader threads so large output cannot
//! deadlock the pipe. The child is polled against a deadline and killed on
//! timeout; the timeout surfaces as [`ExecError::Timeout`], which callers
//! treat as a command failure rather than a crash.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use crate::interfaces::CommandExecutor;
use crate::interfaces::CommandOutput;
use crate::interfaces::ExecError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Poll interval while waiting for a child process to exit.
const WAIT_POLL: Duration = Duration::from_millis(20);

// ============================================================================
// SECTION: System Executor
// ============================================================================

/// Command executor backed by the platform shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    /// Creates a new system executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, command: &str, timeout: Duration) -> Result<CommandOutput, ExecError> {
        let mut child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ExecError::Spawn(err.to_string()))?;

        let stdout = drain_pipe(child.stdout.take());
        let stderr = drain_pipe(child.stderr.take());

        let status = wait_with_deadline(&mut child, timeout)?;
        let stdout = stdout.map_or_else(String::new, |handle| handle.join().unwrap_or_default());
        let stderr = stderr.map_or_else(String::new, |handle| handle.join().unwrap_or_default());

        Ok(CommandOutput {
            exit_code: status,
            stdout,
            stderr,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a shell invocation for the current platform.
fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Spawns a reader thread draining a child pipe into a string.
fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buffer = String::new();
            let _ = reader.read_to_string(&mut buffer);
            buffer
        })
    })
}

/// Polls a child until it exits or the deadline passes, killing on timeout.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<Option<i32>, ExecError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code()),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecError::Timeout {
                        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
                thread::sleep(WAIT_POLL);
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExecError::Io(err.to_string()));
            }
        }
    }
}
