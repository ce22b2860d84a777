// crates/provenance-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared test utilities for Provenance Gate core tests.
// Purpose: Provide deterministic executors and signing fixtures.
// Dependencies: provenance-gate-core
// ============================================================================

//! ## Overview
//! This module provides a scripted command executor and signing fixtures
//! shared across the core test files, so evaluator and report tests run
//! without touching a real shell.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use provenance_gate_core::CommandExecutor;
use provenance_gate_core::CommandOutput;
use provenance_gate_core::ExecError;
use provenance_gate_core::SecretKey;
use provenance_gate_core::SigningService;
use provenance_gate_core::core::DEFAULT_HASH_ALGORITHM;

// ============================================================================
// SECTION: Scripted Executor
// ============================================================================

/// Command executor returning scripted outputs keyed by command line.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    /// Scripted responses per command line.
    responses: BTreeMap<String, CommandOutput>,
    /// Commands that should fail as timeouts.
    timeouts: Vec<String>,
}

impl ScriptedExecutor {
    /// Creates an executor with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful response for a command line.
    #[must_use]
    pub fn with_response(mut self, command: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            CommandOutput {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Scripts a timeout failure for a command line.
    #[must_use]
    pub fn with_timeout(mut self, command: &str) -> Self {
        self.timeouts.push(command.to_string());
        self
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn run(&self, command: &str, timeout: Duration) -> Result<CommandOutput, ExecError> {
        if self.timeouts.iter().any(|entry| entry == command) {
            return Err(ExecError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        self.responses
            .get(command)
            .cloned()
            .ok_or_else(|| ExecError::Spawn(format!("unscripted command: {command}")))
    }
}

// ============================================================================
// SECTION: Signing Fixtures
// ============================================================================

/// Builds a keyed signing service with a fixed test key.
#[must_use]
pub fn keyed_signer() -> SigningService {
    SigningService::new(DEFAULT_HASH_ALGORITHM, Some(SecretKey::new(b"test-signing-key".to_vec())))
}

/// Builds a keyed signing service with a different fixed key.
#[must_use]
pub fn other_keyed_signer() -> SigningService {
    SigningService::new(DEFAULT_HASH_ALGORITHM, Some(SecretKey::new(b"another-key".to_vec())))
}

/// Builds an unkeyed signing service for digest-only mode.
#[must_use]
pub fn unkeyed_signer() -> SigningService {
    SigningService::unkeyed()
}
