// crates/provenance-gate-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Provenance Gate Evidence Evaluator
// Description: Executes declarative evidence manifests against the system.
// Purpose: Classify check failures as errors or warnings under degraded mode.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! The evaluator runs each manifest check and threads an explicit result
//! accumulator through every step; no check can abort evaluation of the
//! others. The degraded-mode policy lives here: a required signature
//! artifact that is missing downgrades to a warning when no signing key is
//! configured, so an operator who has not set up signing does not hard-fail
//! unrelated checks while the gap still surfaces. Freshness findings are
//! always advisory because clock skew and the assumed job-start time are
//! both unreliable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::core::manifest::ArtifactClass;
use crate::core::manifest::CommandCheck;
use crate::core::manifest::EvidenceManifest;
use crate::core::manifest::ExpectedFile;
use crate::core::manifest::TelemetryCheck;
use crate::core::outcome::VerificationResult;
use crate::core::time::Timestamp;
use crate::interfaces::CommandExecutor;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default timeout applied to each manifest command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

// ============================================================================
// SECTION: Trust Context
// ============================================================================

/// Trust state the evaluator applies to its degraded-mode policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustContext {
    /// Whether a signing key is configured for this process.
    pub has_signing_key: bool,
    /// Assumed job-start time for freshness checks; skipped when absent.
    pub job_started_at: Option<Timestamp>,
}

impl TrustContext {
    /// Creates a context with the given key state and no freshness baseline.
    #[must_use]
    pub const fn new(has_signing_key: bool) -> Self {
        Self {
            has_signing_key,
            job_started_at: None,
        }
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Evidence manifest evaluator.
#[derive(Debug)]
pub struct EvidenceEvaluator<E: CommandExecutor> {
    /// Executor for manifest commands.
    executor: E,
    /// Per-command timeout.
    command_timeout: Duration,
}

impl<E: CommandExecutor> EvidenceEvaluator<E> {
    /// Creates an evaluator with the default command timeout.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self {
            executor,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Overrides the per-command timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Evaluates a manifest and accumulates every finding into one result.
    ///
    /// Individual check failures never abort evaluation; only a manifest
    /// that failed to parse (a structural error, handled at the boundary
    /// before this call) prevents checks from running.
    #[must_use]
    pub fn evaluate(&self, manifest: &EvidenceManifest, trust: &TrustContext) -> VerificationResult {
        let mut result = VerificationResult::new();
        for check in &manifest.command_checks {
            self.run_command_check(check, trust, &mut result);
        }
        for check in &manifest.telemetry_checks {
            evaluate_telemetry_check(check, &mut result);
        }
        for path in &manifest.required_files {
            let expected = ExpectedFile {
                path: path.clone(),
                required: true,
                non_empty: false,
            };
            evaluate_expected_file("required_files", &expected, trust, &mut result);
        }
        result
    }

    /// Runs one command check and evaluates its expectations.
    fn run_command_check(
        &self,
        check: &CommandCheck,
        trust: &TrustContext,
        result: &mut VerificationResult,
    ) {
        match self.executor.run(&check.command, self.command_timeout) {
            Ok(output) => {
                if let Some(expected_code) = check.expected_exit_code {
                    if output.exit_code != Some(expected_code) {
                        result.error(format!(
                            "check '{}': expected exit code {expected_code}, got {}",
                            check.name,
                            output
                                .exit_code
                                .map_or_else(|| "none".to_string(), |code| code.to_string()),
                        ));
                    }
                }
                // Output expectations are checked regardless of exit code; a
                // failing command can still emit the evidence being claimed.
                let combined = output.combined();
                for needle in &check.expected_output {
                    if !combined.contains(needle) {
                        result.error(format!(
                            "check '{}': expected output to contain {needle:?}",
                            check.name
                        ));
                    }
                }
            }
            Err(err) => {
                result.error(format!("check '{}': command failed to run: {err}", check.name));
            }
        }

        for expected in &check.expected_files {
            evaluate_expected_file(&check.name, expected, trust, result);
        }
    }
}

// ============================================================================
// SECTION: File Expectations
// ============================================================================

/// Evaluates one expected-file entry under the degraded-mode policy.
fn evaluate_expected_file(
    check_name: &str,
    expected: &ExpectedFile,
    trust: &TrustContext,
    result: &mut VerificationResult,
) {
    let path = Path::new(&expected.path);
    let Ok(metadata) = fs::metadata(path) else {
        if !expected.required {
            return;
        }
        let class = ArtifactClass::classify(path);
        if class == ArtifactClass::Signature && !trust.has_signing_key {
            result.warning(format!(
                "check '{check_name}': signature file missing, attestation disabled: {}",
                expected.path
            ));
        } else {
            result.error(format!("check '{check_name}': required file missing: {}", expected.path));
        }
        return;
    };

    // Zero-byte findings never downgrade, regardless of trust context.
    if expected.non_empty && metadata.len() == 0 {
        result.error(format!("check '{check_name}': file is empty: {}", expected.path));
    }

    if let Some(job_started_at) = trust.job_started_at {
        if let Ok(modified) = metadata.modified() {
            if Timestamp::from_system_time(modified) < job_started_at {
                result.warning(format!(
                    "check '{check_name}': file predates job start: {}",
                    expected.path
                ));
            }
        }
    }
}

// ============================================================================
// SECTION: Telemetry Expectations
// ============================================================================

/// Evaluates one telemetry check over a newline-delimited JSON log.
///
/// A missing log file is advisory; telemetry capture is best-effort.
/// Unparsable lines are skipped rather than failing the check.
fn evaluate_telemetry_check(check: &TelemetryCheck, result: &mut VerificationResult) {
    let Ok(content) = fs::read_to_string(&check.source) else {
        result.warning(format!(
            "telemetry log missing for event '{}': {}",
            check.event, check.source
        ));
        return;
    };

    let found = content.lines().any(|line| {
        serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|record| {
                record.get("event").and_then(Value::as_str).map(|event| event == check.event)
            })
            .unwrap_or(false)
    });

    if !found {
        result.error(format!(
            "telemetry event '{}' not found in {}",
            check.event, check.source
        ));
    }
}
