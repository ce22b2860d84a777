// crates/provenance-gate-core/src/lib.rs
// ============================================================================
// Module: Provenance Gate Core Library
// Description: Public API surface for the Provenance Gate core.
// Purpose: Expose core types, interfaces, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Provenance Gate core answers two questions about artifacts produced by an
//! automated content-generation pipeline: has this artifact been tampered
//! with since it was attested, and does the evidence on disk actually prove
//! a claimed behavior rather than merely asserting it. It provides content
//! normalization, digest and keyed-signature services, a revision-scoped
//! attestation store, a generation receipt ledger, a declarative evidence
//! evaluator with a degraded-mode policy, and a consolidated report
//! aggregator. Integration happens through explicit interfaces so every
//! external effect can be faked in tests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CommandExecutor;
pub use interfaces::CommandOutput;
pub use interfaces::ExecError;
pub use interfaces::RevisionSource;
pub use interfaces::SecretKey;
pub use interfaces::SecretKeyProvider;
pub use runtime::AttestSweep;
pub use runtime::AttestationStore;
pub use runtime::EnvKeyProvider;
pub use runtime::EvidenceEvaluator;
pub use runtime::FileFailure;
pub use runtime::GitRevisionSource;
pub use runtime::LedgerError;
pub use runtime::ProvenanceReport;
pub use runtime::ReceiptLedger;
pub use runtime::ReportBuilder;
pub use runtime::ReproducibilityOutcome;
pub use runtime::SIGNING_KEY_ENV;
pub use runtime::SignError;
pub use runtime::SigningService;
pub use runtime::StaticRevisionSource;
pub use runtime::StoreError;
pub use runtime::SystemCommandExecutor;
pub use runtime::TrustContext;
pub use runtime::VerifySweep;
