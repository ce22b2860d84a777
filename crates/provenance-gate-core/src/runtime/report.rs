// crates/provenance-gate-core/src/runtime/report.rs
// ============================================================================
// Module: Provenance Gate Report Aggregator
// Description: Consolidated, externally auditable provenance reports.
// Purpose: Snapshot checks, files, and environment into one JSON document.
// Dependencies: crate::{core, interfaces, runtime}, serde
// ============================================================================

//! ## Overview
//! The report aggregator runs a fixed battery of commands, replays the
//! attestation verify sweep, optionally evaluates an evidence manifest, and
//! snapshots a curated file set into a single JSON document. The report must
//! be producible even when the system under audit is partially broken, so
//! every internal failure is recorded inside the report instead of
//! propagating out of the aggregator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::core::hashing::ContentDigest;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::digest_bytes;
use crate::core::identifiers::RevisionId;
use crate::core::manifest::EvidenceManifest;
use crate::core::outcome::VerificationResult;
use crate::core::time::Timestamp;
use crate::interfaces::CommandExecutor;
use crate::runtime::evaluator::EvidenceEvaluator;
use crate::runtime::evaluator::TrustContext;
use crate::runtime::store::AttestationStore;
use crate::runtime::store::VerifySweep;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default timeout applied to each report battery command.
const DEFAULT_BATTERY_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Report Document
// ============================================================================

/// Host environment fingerprint embedded in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentFingerprint {
    /// Operating system label.
    pub os: String,
    /// CPU architecture label.
    pub arch: String,
    /// OS family label.
    pub family: String,
}

impl EnvironmentFingerprint {
    /// Captures the compile-target fingerprint of the running process.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            family: std::env::consts::FAMILY.to_string(),
        }
    }
}

/// Transcript of one battery command, including failures to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTranscript {
    /// Battery entry name.
    pub name: String,
    /// Command line that was run.
    pub command: String,
    /// Exit code, when the command ran to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Execution failure recorded in place of a crash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of one curated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSnapshot {
    /// Snapshotted path.
    pub path: String,
    /// Digest of the file bytes, when readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<ContentDigest>,
    /// File size in bytes, when readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,
    /// Read failure recorded in place of a crash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Attestation verify section of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestationSection {
    /// Verify sweep outcome, when the sweep could run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<VerifySweep>,
    /// Sweep failure recorded in place of a crash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Consolidated provenance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvenanceReport {
    /// UTC generation time.
    pub generated_at: Timestamp,
    /// Revision the report was generated against.
    pub revision: RevisionId,
    /// Host environment fingerprint.
    pub environment: EnvironmentFingerprint,
    /// Battery command transcripts.
    pub commands: Vec<CommandTranscript>,
    /// Attestation verify section, when a store was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationSection>,
    /// Evidence manifest evaluation, when a manifest was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<VerificationResult>,
    /// Curated file snapshots.
    pub snapshots: Vec<FileSnapshot>,
}

impl ProvenanceReport {
    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the report cannot be encoded.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// SECTION: Battery Entry
// ============================================================================

/// Named command in the report battery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatteryCommand {
    /// Battery entry name.
    pub name: String,
    /// Command line to run.
    pub command: String,
}

// ============================================================================
// SECTION: Report Builder
// ============================================================================

/// Builder assembling the inputs of one provenance report.
#[derive(Debug)]
pub struct ReportBuilder<E: CommandExecutor> {
    /// Executor for battery commands.
    executor: E,
    /// Per-command timeout.
    command_timeout: Duration,
    /// Hash algorithm for file snapshots.
    algorithm: HashAlgorithm,
    /// Battery commands to run.
    commands: Vec<BatteryCommand>,
    /// Curated files to snapshot.
    snapshot_paths: Vec<PathBuf>,
    /// Attestation verify target: store, sweep root, allowed extensions.
    verify_target: Option<(AttestationStore, PathBuf, Vec<String>)>,
    /// Evidence manifest to evaluate alongside the battery.
    evidence: Option<(EvidenceManifest, TrustContext)>,
}

impl<E: CommandExecutor + Clone> ReportBuilder<E> {
    /// Creates an empty builder around an executor.
    #[must_use]
    pub const fn new(executor: E, algorithm: HashAlgorithm) -> Self {
        Self {
            executor,
            command_timeout: DEFAULT_BATTERY_TIMEOUT,
            algorithm,
            commands: Vec::new(),
            snapshot_paths: Vec::new(),
            verify_target: None,
            evidence: None,
        }
    }

    /// Overrides the per-command timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Adds a named command to the battery.
    #[must_use]
    pub fn with_command(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.commands.push(BatteryCommand {
            name: name.into(),
            command: command.into(),
        });
        self
    }

    /// Adds a curated file to snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_paths.push(path.into());
        self
    }

    /// Configures the attestation verify sweep to replay.
    #[must_use]
    pub fn with_verify_sweep(
        mut self,
        store: AttestationStore,
        root: impl Into<PathBuf>,
        allowed_extensions: &[&str],
    ) -> Self {
        self.verify_target = Some((
            store,
            root.into(),
            allowed_extensions.iter().map(|ext| (*ext).to_string()).collect(),
        ));
        self
    }

    /// Configures an evidence manifest to evaluate.
    #[must_use]
    pub fn with_evidence(mut self, manifest: EvidenceManifest, trust: TrustContext) -> Self {
        self.evidence = Some((manifest, trust));
        self
    }

    /// Generates the consolidated report.
    ///
    /// Never fails: every internal error is recorded inside the report so
    /// the document is produced even when the audited system is broken.
    #[must_use]
    pub fn generate(&self, revision: RevisionId) -> ProvenanceReport {
        let mut transcripts = Vec::with_capacity(self.commands.len());
        for entry in &self.commands {
            transcripts.push(self.run_battery_command(entry));
        }

        let attestation = self.verify_target.as_ref().map(|(store, root, extensions)| {
            let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
            match store.verify_directory(root, &refs) {
                Ok(sweep) => AttestationSection {
                    sweep: Some(sweep),
                    error: None,
                },
                Err(err) => AttestationSection {
                    sweep: None,
                    error: Some(err.to_string()),
                },
            }
        });

        let evidence = self.evidence.as_ref().map(|(manifest, trust)| {
            EvidenceEvaluator::new(self.executor.clone())
                .with_timeout(self.command_timeout)
                .evaluate(manifest, trust)
        });

        let snapshots = self.snapshot_paths.iter().map(|path| self.snapshot(path)).collect();

        ProvenanceReport {
            generated_at: Timestamp::now(),
            revision,
            environment: EnvironmentFingerprint::capture(),
            commands: transcripts,
            attestation,
            evidence,
            snapshots,
        }
    }

    /// Runs one battery command, recording failure instead of propagating.
    fn run_battery_command(&self, entry: &BatteryCommand) -> CommandTranscript {
        match self.executor.run(&entry.command, self.command_timeout) {
            Ok(output) => CommandTranscript {
                name: entry.name.clone(),
                command: entry.command.clone(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
                error: None,
            },
            Err(err) => CommandTranscript {
                name: entry.name.clone(),
                command: entry.command.clone(),
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                error: Some(err.to_string()),
            },
        }
    }

    /// Snapshots one curated file, recording failure instead of propagating.
    fn snapshot(&self, path: &std::path::Path) -> FileSnapshot {
        let shown = path.display().to_string();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                return FileSnapshot {
                    path: shown,
                    digest: None,
                    size: None,
                    modified: None,
                    error: Some(err.to_string()),
                };
            }
        };
        let digest = fs::read(path).map(|bytes| digest_bytes(self.algorithm, &bytes)).ok();
        FileSnapshot {
            path: shown,
            digest,
            size: Some(metadata.len()),
            modified: metadata.modified().ok().map(Timestamp::from_system_time),
            error: None,
        }
    }
}
