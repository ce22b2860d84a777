// crates/provenance-gate-core/src/core/outcome.rs
// ============================================================================
// Module: Provenance Gate Verification Outcomes
// Description: Accumulated errors and warnings from verification passes.
// Purpose: Provide the single result type shared by evaluator and verify paths.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every verification pass accumulates findings into a [`VerificationResult`]
//! rather than throwing past the item-level operation. An empty error list
//! means the claim is substantiated; warnings are advisory and never block a
//! pass decision on their own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Verification Status
// ============================================================================

/// Pass/fail classification derived from accumulated errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// No errors were accumulated.
    Pass,
    /// At least one error was accumulated.
    Fail,
}

// ============================================================================
// SECTION: Verification Result
// ============================================================================

/// Accumulated verification findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Blocking findings; any entry fails the overall decision.
    pub errors: Vec<String>,
    /// Advisory findings; never block a pass decision.
    pub warnings: Vec<String>,
}

impl VerificationResult {
    /// Creates an empty result.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Records a blocking finding.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records an advisory finding.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Absorbs another result's findings.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Returns true when no blocking finding was recorded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the pass/fail status for this result.
    #[must_use]
    pub fn status(&self) -> VerificationStatus {
        if self.passed() { VerificationStatus::Pass } else { VerificationStatus::Fail }
    }
}
