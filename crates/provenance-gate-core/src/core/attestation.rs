// crates/provenance-gate-core/src/core/attestation.rs
// ============================================================================
// Module: Provenance Gate Attestation Records
// Description: Signed integrity claims for tracked artifacts.
// Purpose: Define the on-disk attestation record and attest outcomes.
// Dependencies: crate::core::{hashing, identifiers, time}, serde
// ============================================================================

//! ## Overview
//! An attestation record is a claim that an artifact's normalized content
//! matched a recorded digest as of a given revision. Records are immutable
//! once written; a re-attestation replaces the whole file atomically rather
//! than mutating it in place. The `signature` field is absent in unkeyed
//! mode, which is a first-class state rather than an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::ContentDigest;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::Signature;
use crate::core::identifiers::RevisionId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Attestation Record
// ============================================================================

/// Serialized attestation record stored at `{root}/{revision}/{path}.sig`.
///
/// # Invariants
/// - `hash` is the digest of the artifact's *normalized* content.
/// - `signature` is present iff a signing key was configured at attest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    /// Artifact path as supplied to the attest operation.
    pub file: String,
    /// Digest of the normalized artifact content.
    pub hash: ContentDigest,
    /// Keyed signature over the digest, when a key was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    /// UTC time the attestation was produced.
    pub timestamp: Timestamp,
    /// Version-control revision the attestation is scoped to.
    pub commit: RevisionId,
    /// Hash algorithm label for the digest.
    pub algorithm: HashAlgorithm,
}

// ============================================================================
// SECTION: Attest Outcome
// ============================================================================

/// Result of attesting a single artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationOutcome {
    /// Artifact path that was attested.
    pub file: String,
    /// Digest recorded for the artifact.
    pub digest: ContentDigest,
    /// Signature recorded for the artifact, when keyed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}
