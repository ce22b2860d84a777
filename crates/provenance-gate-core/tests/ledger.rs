// crates/provenance-gate-core/tests/ledger.rs
// ============================================================================
// Module: Receipt Ledger Tests
// Description: Tests for generation receipts and reproducibility checks.
// Purpose: Validate receipt lifecycle and the asymmetric reproduction rule.
// ============================================================================
//! ## Overview
//! Validates receipt persistence, coexistence of same-input runs, output and
//! validation attachment, and every reasoned outcome of the reproducibility
//! check.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::fs;
use std::path::PathBuf;

use common::unkeyed_signer;
use provenance_gate_core::BlueprintId;
use provenance_gate_core::BlueprintIdentity;
use provenance_gate_core::ExecutionParams;
use provenance_gate_core::GenerationReceipt;
use provenance_gate_core::LedgerError;
use provenance_gate_core::RECEIPT_KEY_LEN;
use provenance_gate_core::ReceiptKey;
use provenance_gate_core::ReceiptLedger;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Blueprint path used by the default fixture.
const BLUEPRINT_PATH: &str = "blueprints/report.bp";

/// Builds a ledger over a fresh temp directory.
fn ledger_in(dir: &TempDir) -> ReceiptLedger {
    ReceiptLedger::new(dir.path().join("receipts"), unkeyed_signer())
}

/// Builds the default blueprint identity fixture.
fn blueprint() -> BlueprintIdentity {
    BlueprintIdentity {
        id: BlueprintId::new("bp-report"),
        version: "1.2.0".to_string(),
        path: BLUEPRINT_PATH.to_string(),
    }
}

/// Builds execution params with the given seed.
fn params(seed: u64) -> ExecutionParams {
    ExecutionParams {
        seed,
        temperature: 0.0,
        mode: "strict".to_string(),
    }
}

/// Writes an output artifact under the temp directory.
fn write_output(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("out.md");
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// SECTION: Receipt Lifecycle
// ============================================================================

/// Tests a new receipt starts without output and with reproduced false.
#[test]
fn test_begin_generation_initial_state() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let receipt =
        ledger.begin_generation("blueprint text", blueprint(), params(7), "gen-2.1").unwrap();
    assert!(receipt.output_digest.is_none());
    assert!(receipt.output_path.is_none());
    assert!(!receipt.reproduced);
    assert_eq!(receipt.key().as_str().len(), RECEIPT_KEY_LEN);
    assert!(ledger.receipt_path(&receipt.key(), 1).exists());
}

/// Tests equal inputs map to equal keys and distinct inputs do not.
#[test]
fn test_input_digest_keys() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    let same = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    let other = ledger.begin_generation("text", blueprint(), params(8), "gen-2.1").unwrap();
    assert_eq!(first.key(), same.key());
    assert_ne!(first.key(), other.key());
}

/// Tests repeated same-input runs store separate receipt files.
#[test]
fn test_same_inputs_coexist_on_disk() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    assert!(ledger.receipt_path(&first.key(), 1).exists());
    assert!(ledger.receipt_path(&first.key(), 2).exists());
    assert_eq!(ledger.list(None).unwrap().len(), 2);
}

/// Tests a deleted earlier run never re-issues its sequence number.
#[test]
fn test_seq_not_reissued_after_deletion() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    fs::remove_file(ledger.receipt_path(&first.key(), 1)).unwrap();

    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();

    assert!(ledger.receipt_path(&first.key(), 3).exists());
    let bytes = fs::read(ledger.receipt_path(&first.key(), 2)).unwrap();
    let second: GenerationReceipt = serde_json::from_slice(&bytes).unwrap();
    assert!(second.output_digest.is_some(), "earlier run overwrote a surviving receipt");
}

/// Tests attaching an output records its digest and path.
#[test]
fn test_attach_output() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let receipt = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    let updated = ledger.attach_output(&receipt.key(), &output).unwrap();
    assert!(updated.output_digest.is_some());
    assert_eq!(updated.output_path.as_deref(), Some(output.display().to_string().as_str()));

    let reloaded = ledger.load(&receipt.key()).unwrap();
    assert_eq!(reloaded.output_digest, updated.output_digest);
}

/// Tests validation outcomes persist without touching the reproduced flag.
#[test]
fn test_attach_validation() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let receipt = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_validation(&receipt.key(), true, true, false).unwrap();

    let reloaded = ledger.load(&receipt.key()).unwrap();
    assert_eq!(reloaded.validation.build, Some(true));
    assert_eq!(reloaded.validation.test, Some(true));
    assert_eq!(reloaded.validation.lint, Some(false));
    assert!(!reloaded.reproduced);
}

/// Tests loading an unknown key is a not-found error.
#[test]
fn test_load_unknown_key() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let missing = ReceiptKey::new("0000000000000000");
    assert!(matches!(ledger.load(&missing), Err(LedgerError::NotFound(_))));
}

/// Tests listing filters by blueprint identifier.
#[test]
fn test_list_filters_by_blueprint() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    let other = BlueprintIdentity {
        id: BlueprintId::new("bp-other"),
        version: "0.1.0".to_string(),
        path: "blueprints/other.bp".to_string(),
    };
    ledger.begin_generation("other text", other, params(7), "gen-2.1").unwrap();

    let filtered = ledger.list(Some(&BlueprintId::new("bp-report"))).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].blueprint.id, BlueprintId::new("bp-report"));
    assert_eq!(ledger.list(None).unwrap().len(), 2);
}

// ============================================================================
// SECTION: Reproducibility
// ============================================================================

/// Tests a single receipt cannot certify reproduction.
#[test]
fn test_repro_needs_two_receipts() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(!outcome.reproduced);
    assert!(outcome.detail.contains("at least two receipts"));
}

/// Tests bit-exact reproduction is confirmed and persisted.
#[test]
fn test_repro_confirms_bit_exact_output() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(outcome.reproduced, "{}", outcome.detail);

    let newest = ledger.load(&first.key()).unwrap();
    assert!(newest.reproduced);
}

/// Tests reproduction also holds when the later run attached its output.
#[test]
fn test_repro_with_output_attached_to_later_run() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(outcome.reproduced, "{}", outcome.detail);
    assert!(ledger.load(&first.key()).unwrap().reproduced);
}

/// Tests differing inputs between runs block the comparison.
#[test]
fn test_repro_rejects_input_mismatch() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    ledger.begin_generation("text", blueprint(), params(8), "gen-2.1").unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(!outcome.reproduced);
    assert!(outcome.detail.contains("input mismatch"));
}

/// Tests a previous receipt without an output digest cannot be compared.
#[test]
fn test_repro_requires_previous_output_digest() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(!outcome.reproduced);
    assert!(outcome.detail.contains("no stored output digest"));
}

/// Tests a missing output file is reported, not raised.
#[test]
fn test_repro_reports_missing_output() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    fs::remove_file(&output).unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(!outcome.reproduced);
    assert!(outcome.detail.contains("output not found"));
}

/// Tests a drifted current output fails against the stored digest.
#[test]
fn test_repro_detects_output_drift() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    let output = write_output(&dir, "generated body\n");

    let first = ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    ledger.attach_output(&first.key(), &output).unwrap();
    ledger.begin_generation("text", blueprint(), params(7), "gen-2.1").unwrap();
    fs::write(&output, "regenerated differently\n").unwrap();

    let outcome = ledger.check_reproducibility(BLUEPRINT_PATH).unwrap();
    assert!(!outcome.reproduced);
    assert!(outcome.detail.contains("output digest mismatch"));
}
