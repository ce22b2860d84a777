// crates/provenance-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Provenance Gate Runtime
// Description: Signing, storage, ledger, evaluation, and reporting services.
// Purpose: Provide the operational services built on the core data model.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime services implement the operational side of Provenance Gate: the
//! signing service, the filesystem attestation store, the generation
//! receipt ledger, the evidence manifest evaluator, the system command
//! executor, and the provenance report aggregator.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod evaluator;
pub mod exec;
pub mod ledger;
pub mod report;
pub mod signer;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use evaluator::DEFAULT_COMMAND_TIMEOUT;
pub use evaluator::EvidenceEvaluator;
pub use evaluator::TrustContext;
pub use exec::SystemCommandExecutor;
pub use ledger::LedgerError;
pub use ledger::ReceiptLedger;
pub use ledger::ReproducibilityOutcome;
pub use report::AttestationSection;
pub use report::BatteryCommand;
pub use report::CommandTranscript;
pub use report::EnvironmentFingerprint;
pub use report::FileSnapshot;
pub use report::ProvenanceReport;
pub use report::ReportBuilder;
pub use signer::EnvKeyProvider;
pub use signer::GitRevisionSource;
pub use signer::SIGNING_KEY_ENV;
pub use signer::SignError;
pub use signer::SigningService;
pub use signer::StaticRevisionSource;
pub use store::AttestSweep;
pub use store::AttestationStore;
pub use store::FileFailure;
pub use store::SKIP_DIRS;
pub use store::StoreError;
pub use store::VerifySweep;
