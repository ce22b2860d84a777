// crates/provenance-gate-core/tests/report.rs
// ============================================================================
// Module: Report Aggregator Tests
// Description: Tests for consolidated provenance report generation.
// Purpose: Validate reports record failures instead of propagating them.
// ============================================================================
//! ## Overview
//! Validates that report generation never fails, embeds command
//! transcripts, file snapshots, attestation sweeps, and evidence findings,
//! and serializes to a stable JSON document.

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

use common::ScriptedExecutor;
use common::keyed_signer;
use provenance_gate_core::AttestationStore;
use provenance_gate_core::ReportBuilder;
use provenance_gate_core::RevisionId;
use provenance_gate_core::TrustContext;
use provenance_gate_core::core::DEFAULT_HASH_ALGORITHM;
use provenance_gate_core::core::EvidenceManifest;
use provenance_gate_core::core::TelemetryCheck;
use tempfile::TempDir;

// ============================================================================
// SECTION: Battery Commands
// ============================================================================

/// Tests transcripts capture output of commands that ran.
#[test]
fn test_report_records_command_transcripts() {
    let executor = ScriptedExecutor::new().with_response("uname -a", 0, "Linux host", "");
    let report = ReportBuilder::new(executor, DEFAULT_HASH_ALGORITHM)
        .with_command("kernel", "uname -a")
        .generate(RevisionId::new("rev1"));

    assert_eq!(report.revision, RevisionId::new("rev1"));
    assert_eq!(report.commands.len(), 1);
    assert_eq!(report.commands[0].name, "kernel");
    assert_eq!(report.commands[0].exit_code, Some(0));
    assert_eq!(report.commands[0].stdout, "Linux host");
    assert!(report.commands[0].error.is_none());
}

/// Tests a command that fails to run is recorded, not propagated.
#[test]
fn test_report_records_command_failures() {
    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_command("ghost", "no-such-command")
        .generate(RevisionId::local());

    assert_eq!(report.commands.len(), 1);
    assert!(report.commands[0].exit_code.is_none());
    assert!(report.commands[0].error.is_some());
}

// ============================================================================
// SECTION: File Snapshots
// ============================================================================

/// Tests snapshots carry digest, size, and modification time.
#[test]
fn test_report_snapshots_readable_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manifest.json");
    fs::write(&path, b"{}").unwrap();

    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_snapshot(&path)
        .generate(RevisionId::local());

    assert_eq!(report.snapshots.len(), 1);
    let snapshot = &report.snapshots[0];
    assert!(snapshot.digest.is_some());
    assert_eq!(snapshot.size, Some(2));
    assert!(snapshot.error.is_none());
}

/// Tests an unreadable snapshot path is recorded in place.
#[test]
fn test_report_records_snapshot_failures() {
    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_snapshot("no/such/file.json")
        .generate(RevisionId::local());

    assert_eq!(report.snapshots.len(), 1);
    assert!(report.snapshots[0].digest.is_none());
    assert!(report.snapshots[0].error.is_some());
}

// ============================================================================
// SECTION: Embedded Sections
// ============================================================================

/// Tests the attestation sweep is replayed into the report.
#[test]
fn test_report_embeds_verify_sweep() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("doc.md");
    fs::write(&artifact, "content\n").unwrap();
    let store =
        AttestationStore::new(dir.path().join(".provenance"), RevisionId::new("rev1"), keyed_signer());
    store.attest(&artifact).unwrap();

    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_verify_sweep(store, dir.path(), &["md"])
        .generate(RevisionId::new("rev1"));

    let section = report.attestation.unwrap();
    let sweep = section.sweep.unwrap();
    assert!(sweep.all_passed());
    assert_eq!(sweep.passed.len(), 1);
}

/// Tests a failing sweep is recorded inside the section.
#[test]
fn test_report_records_sweep_failure() {
    let dir = TempDir::new().unwrap();
    let store =
        AttestationStore::new(dir.path().join(".provenance"), RevisionId::new("rev1"), keyed_signer());

    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_verify_sweep(store, dir.path().join("absent"), &["md"])
        .generate(RevisionId::new("rev1"));

    let section = report.attestation.unwrap();
    assert!(section.sweep.is_none());
    assert!(section.error.is_some());
}

/// Tests evidence findings land in the report without failing generation.
#[test]
fn test_report_embeds_evidence_findings() {
    let manifest = EvidenceManifest {
        command_checks: Vec::new(),
        telemetry_checks: vec![TelemetryCheck {
            event: "startup".to_string(),
            source: "missing.ndjson".to_string(),
        }],
        required_files: vec!["also-missing.txt".to_string()],
    };

    let report = ReportBuilder::new(ScriptedExecutor::new(), DEFAULT_HASH_ALGORITHM)
        .with_evidence(manifest, TrustContext::new(false))
        .generate(RevisionId::local());

    let evidence = report.evidence.unwrap();
    assert!(!evidence.passed());
    assert!(!evidence.warnings.is_empty());
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

/// Tests the full report serializes as a JSON object.
#[test]
fn test_report_serializes_to_json() {
    let executor = ScriptedExecutor::new().with_response("true", 0, "", "");
    let report = ReportBuilder::new(executor, DEFAULT_HASH_ALGORITHM)
        .with_command("noop", "true")
        .generate(RevisionId::new("rev1"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["revision"], "rev1");
    assert!(json["generated_at"].is_string());
    assert!(json["environment"]["os"].is_string());
    assert!(json["commands"].is_array());
}
