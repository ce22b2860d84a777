// crates/provenance-gate-core/src/core/receipt.rs
// ============================================================================
// Module: Provenance Gate Generation Receipts
// Description: Records tying generation inputs to output digests.
// Purpose: Define the receipt data model used to prove reproducibility.
// Dependencies: crate::core::{hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! A generation receipt captures everything needed to replay a deterministic
//! generation run: the canonical digest of its inputs, the execution
//! parameters, and (once known) the digest and location of its output.
//! Receipts are keyed by a fixed-length prefix of the input digest and live
//! one file per receipt in the ledger directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::ContentDigest;
use crate::core::identifiers::BlueprintId;
use crate::core::identifiers::ReceiptKey;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Length of the input digest prefix used as the receipt storage key.
pub const RECEIPT_KEY_LEN: usize = 16;

// ============================================================================
// SECTION: Receipt Sub-Records
// ============================================================================

/// Identity of the blueprint a generation run consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintIdentity {
    /// Blueprint identifier.
    pub id: BlueprintId,
    /// Blueprint version label.
    pub version: String,
    /// Blueprint path as supplied by the pipeline.
    pub path: String,
}

/// Execution parameters that shape a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Random seed supplied to the generator.
    pub seed: u64,
    /// Sampling temperature supplied to the generator.
    pub temperature: f64,
    /// Generation mode label supplied by the pipeline.
    pub mode: String,
}

/// Validation outcomes attached after the output was checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcomes {
    /// Build validation outcome, when run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<bool>,
    /// Test validation outcome, when run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<bool>,
    /// Lint validation outcome, when run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint: Option<bool>,
}

// ============================================================================
// SECTION: Generation Receipt
// ============================================================================

/// Deterministic-generation transaction record.
///
/// # Invariants
/// - `input_digest` is the canonical JSON digest of the generation inputs.
/// - `output_digest` stays empty until an output is attached.
/// - `reproduced` flips true only when a later run regenerated byte-identical
///   output for the same inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReceipt {
    /// Canonical digest of the generation inputs.
    pub input_digest: ContentDigest,
    /// Model version label for the generating system.
    pub model_version: String,
    /// Digest of the normalized output artifact, once attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_digest: Option<ContentDigest>,
    /// Path of the output artifact, once attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// UTC time the receipt was created.
    pub timestamp: Timestamp,
    /// Whether a later run reproduced this output bit-exactly.
    pub reproduced: bool,
    /// Blueprint identity for the run.
    pub blueprint: BlueprintIdentity,
    /// Execution parameters for the run.
    pub params: ExecutionParams,
    /// Validation outcomes, attached after generation.
    #[serde(default)]
    pub validation: ValidationOutcomes,
}

impl GenerationReceipt {
    /// Returns the storage key for this receipt.
    #[must_use]
    pub fn key(&self) -> ReceiptKey {
        ReceiptKey::new(self.input_digest.prefix(RECEIPT_KEY_LEN))
    }
}
