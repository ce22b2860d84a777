// crates/provenance-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Provenance Gate Interfaces
// Description: Narrow seams for command execution, secrets, and revisions.
// Purpose: Define the contract surfaces used by the Provenance Gate runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Provenance Gate reaches its environment without
//! embedding backend-specific details. The evaluator runs commands only
//! through [`CommandExecutor`], the signing service obtains its key only
//! through [`SecretKeyProvider`], and revision lookup happens only through
//! [`RevisionSource`], so each can be replaced by a deterministic fake in
//! tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::RevisionId;

// ============================================================================
// SECTION: Command Executor
// ============================================================================

/// Captured output of an executed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Process exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns stdout and stderr joined for substring matching.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut out = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        out.push_str(&self.stdout);
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }

    /// Returns true when the process exited with code zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Command execution errors.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command could not be spawned.
    #[error("failed to spawn command: {0}")]
    Spawn(String),
    /// The command exceeded the caller-supplied timeout and was killed.
    #[error("command timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that was exceeded, in milliseconds.
        timeout_ms: u64,
    },
    /// An I/O error occurred while waiting on the command.
    #[error("command io error: {0}")]
    Io(String),
}

/// Synchronous command execution facility.
///
/// Callers supply a timeout and must treat a timeout as a command failure,
/// not a crash of the enclosing operation.
pub trait CommandExecutor {
    /// Runs a command and captures its exit status and output.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] when the command cannot be spawned, times out,
    /// or fails at the I/O layer.
    fn run(&self, command: &str, timeout: Duration) -> Result<CommandOutput, ExecError>;
}

// ============================================================================
// SECTION: Secret Key Provider
// ============================================================================

/// Process-wide secret key material for keyed signatures.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wraps raw key bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material never appears in debug output.
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Source of the process-wide signing key.
///
/// A missing key puts the signing service into unkeyed mode rather than
/// failing the process.
pub trait SecretKeyProvider {
    /// Returns the signing key, when configured.
    fn key(&self) -> Option<SecretKey>;
}

// ============================================================================
// SECTION: Revision Source
// ============================================================================

/// Source of the version-control revision identifier.
///
/// Implementations fall back to [`RevisionId::local`] when version control
/// is unavailable; lookup is never fatal.
pub trait RevisionSource {
    /// Returns the current revision identifier.
    fn revision(&self) -> RevisionId;
}
