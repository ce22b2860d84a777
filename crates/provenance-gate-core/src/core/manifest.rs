// crates/provenance-gate-core/src/core/manifest.rs
// ============================================================================
// Module: Provenance Gate Evidence Manifest
// Description: Declarative check manifests consumed by the evaluator.
// Purpose: Validate externally authored evidence manifests at the boundary.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An evidence manifest declares the commands, expected files, and telemetry
//! events that substantiate a claimed capability. Manifests are read-only
//! inputs: this subsystem never produces or mutates them. Shape validation
//! happens here at the boundary; a manifest that fails to parse is a
//! structural error that aborts evaluation before any check runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Manifest Shape
// ============================================================================

/// Declarative evidence manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceManifest {
    /// Ordered command checks to execute.
    #[serde(default)]
    pub command_checks: Vec<CommandCheck>,
    /// Telemetry events expected in newline-delimited JSON logs.
    #[serde(default)]
    pub telemetry_checks: Vec<TelemetryCheck>,
    /// Files that must exist regardless of any command.
    #[serde(default)]
    pub required_files: Vec<String>,
}

/// Single command check within a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandCheck {
    /// Human-readable check name used in findings.
    pub name: String,
    /// Shell command to execute.
    pub command: String,
    /// Exit code the command must produce, when constrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_exit_code: Option<i32>,
    /// Substrings expected in the combined stdout/stderr output.
    #[serde(default)]
    pub expected_output: Vec<String>,
    /// Files expected to exist after the command ran.
    #[serde(default)]
    pub expected_files: Vec<ExpectedFile>,
}

/// File expectation attached to a command check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedFile {
    /// Path the file is expected at.
    pub path: String,
    /// Whether absence is a finding (subject to the degraded-mode policy).
    #[serde(default = "default_required")]
    pub required: bool,
    /// Whether a zero-byte file is a finding.
    #[serde(default)]
    pub non_empty: bool,
}

/// Telemetry event expectation within a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryCheck {
    /// Event name expected in the telemetry log.
    pub event: String,
    /// Path of the newline-delimited JSON telemetry log.
    pub source: String,
}

/// Default for [`ExpectedFile::required`].
const fn default_required() -> bool {
    true
}

// ============================================================================
// SECTION: Artifact Classification
// ============================================================================

/// Classification of a manifest path for the degraded-mode policy.
///
/// The downgrade rule for missing files keys off this explicit
/// classification rather than scattering suffix checks through the
/// evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactClass {
    /// A signature artifact produced by the attestation store.
    Signature,
    /// Any other file.
    Regular,
}

impl ArtifactClass {
    /// Classifies a path by its attestation-store naming convention.
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        let is_sig = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("sig"));
        if is_sig { Self::Signature } else { Self::Regular }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural errors raised while parsing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest bytes are not valid JSON for the declared shape.
    #[error("manifest does not match its declared shape: {0}")]
    Shape(String),
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses manifest bytes, rejecting malformed input at the boundary.
///
/// # Errors
///
/// Returns [`ManifestError::Shape`] when the bytes fail to parse against the
/// manifest shape; evaluation must not begin in that case.
pub fn parse_manifest(bytes: &[u8]) -> Result<EvidenceManifest, ManifestError> {
    serde_json::from_slice(bytes).map_err(|err| ManifestError::Shape(err.to_string()))
}
