// crates/provenance-gate-core/src/core/mod.rs
// ============================================================================
// Module: Provenance Gate Core Types
// Description: Canonical attestation, receipt, and manifest structures.
// Purpose: Provide stable, serializable types for Provenance Gate records.
// Dependencies: serde, serde_jcs, sha2, time
// ============================================================================

//! ## Overview
//! Provenance Gate core types define attestation records, generation
//! receipts, evidence manifests, and verification outcomes. These types are
//! the canonical source of truth for everything the runtime persists or
//! reports.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod attestation;
pub mod hashing;
pub mod identifiers;
pub mod manifest;
pub mod normalize;
pub mod outcome;
pub mod receipt;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use attestation::AttestationOutcome;
pub use attestation::AttestationRecord;
pub use hashing::ContentDigest;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashError;
pub use hashing::Signature;
pub use hashing::canonical_json;
pub use hashing::digest_bytes;
pub use hashing::digest_canonical_json;
pub use hashing::digest_text;
pub use identifiers::BlueprintId;
pub use identifiers::ReceiptKey;
pub use identifiers::RevisionId;
pub use manifest::ArtifactClass;
pub use manifest::CommandCheck;
pub use manifest::EvidenceManifest;
pub use manifest::ExpectedFile;
pub use manifest::ManifestError;
pub use manifest::TelemetryCheck;
pub use manifest::parse_manifest;
pub use normalize::is_hash_annotation;
pub use normalize::normalize;
pub use outcome::VerificationResult;
pub use outcome::VerificationStatus;
pub use receipt::BlueprintIdentity;
pub use receipt::ExecutionParams;
pub use receipt::GenerationReceipt;
pub use receipt::RECEIPT_KEY_LEN;
pub use receipt::ValidationOutcomes;
pub use time::Timestamp;
