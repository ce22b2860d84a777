// crates/provenance-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Provenance Gate Attestation Store
// Description: Filesystem-backed attestation records keyed by revision and path.
// Purpose: Attest and verify artifacts, sweeping directories without aborting.
// Dependencies: crate::{core, runtime::signer}, serde_json
// ============================================================================

//! ## Overview
//! The attestation store persists one record per artifact under
//! `{output_root}/{revision}/{path}.sig`. Every operation is a single
//! read-modify-write; directory sweeps are loops of independent single-file
//! transactions that collect per-file failures instead of aborting. Record
//! writes go through a temp-file rename so an overwrite is all-or-nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::attestation::AttestationOutcome;
use crate::core::attestation::AttestationRecord;
use crate::core::hashing::Signature;
use crate::core::identifiers::RevisionId;
use crate::core::outcome::VerificationResult;
use crate::core::time::Timestamp;
use crate::runtime::signer::SigningService;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory names always skipped during traversal.
///
/// Covers version-control metadata and dependency caches.
pub const SKIP_DIRS: &[&str] =
    &[".git", ".hg", ".svn", "node_modules", "target", "__pycache__", ".venv", "vendor"];

/// Suffix appended to artifact paths for attestation records.
const RECORD_SUFFIX: &str = ".sig";

/// Suffix used for in-flight atomic writes.
const TMP_SUFFIX: &str = ".tmp";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Unrecoverable attestation store errors.
///
/// Per-file verification findings are accumulated in results instead; only
/// failures of the whole operation surface here.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store output directory could not be created or written.
    #[error("attestation store io error at {path}: {detail}")]
    Io {
        /// Path the operation failed on.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// The sweep root does not exist or is not readable.
    #[error("sweep root unreadable at {path}: {detail}")]
    SweepRoot {
        /// Root path the sweep was asked to visit.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// Signing failed for a keyed store.
    #[error("signing failed: {0}")]
    Sign(String),
}

// ============================================================================
// SECTION: Sweep Results
// ============================================================================

/// Per-file failure recorded during a directory sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    /// Artifact path the failure applies to.
    pub file: String,
    /// Failure reason.
    pub reason: String,
}

/// Outcome of attesting a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttestSweep {
    /// Signature per attested file; `None` in digest-only mode.
    pub signatures: BTreeMap<String, Option<Signature>>,
    /// Files that could not be attested.
    pub failures: Vec<FileFailure>,
}

/// Outcome of verifying a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifySweep {
    /// Files that verified cleanly.
    pub passed: Vec<String>,
    /// Files that failed verification, with reasons.
    pub failures: Vec<FileFailure>,
    /// Advisory findings collected across the sweep.
    pub warnings: Vec<String>,
}

impl VerifySweep {
    /// Returns true when every visited file verified.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SECTION: Attestation Store
// ============================================================================

/// Filesystem-backed attestation store scoped to one revision.
#[derive(Debug, Clone)]
pub struct AttestationStore {
    /// Root directory for attestation records.
    output_root: PathBuf,
    /// Revision namespace for all records written by this store.
    revision: RevisionId,
    /// Digest and signature service.
    signer: SigningService,
}

impl AttestationStore {
    /// Creates a store rooted at `output_root` for the given revision.
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>, revision: RevisionId, signer: SigningService) -> Self {
        Self {
            output_root: output_root.into(),
            revision,
            signer,
        }
    }

    /// Returns the signing service backing this store.
    #[must_use]
    pub const fn signer(&self) -> &SigningService {
        &self.signer
    }

    /// Returns the record path for an artifact.
    #[must_use]
    pub fn record_path(&self, artifact: &Path) -> PathBuf {
        let mut rel = PathBuf::new();
        for component in artifact.components() {
            if let Component::Normal(part) = component {
                rel.push(part);
            }
        }
        let mut full = self.output_root.join(self.revision.as_str()).join(rel).into_os_string();
        full.push(RECORD_SUFFIX);
        PathBuf::from(full)
    }

    /// Attests a single artifact, replacing any previous record atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the artifact is unreadable, the record
    /// directory cannot be created, or signing fails with a configured key.
    pub fn attest(&self, artifact: &Path) -> Result<AttestationOutcome, StoreError> {
        let raw = fs::read_to_string(artifact).map_err(|err| StoreError::Io {
            path: artifact.display().to_string(),
            detail: err.to_string(),
        })?;
        let digest = self.signer.digest_content(&raw);
        let signature = if self.signer.has_key() {
            Some(self.signer.sign(&digest).map_err(|err| StoreError::Sign(err.to_string()))?)
        } else {
            None
        };

        let record = AttestationRecord {
            file: artifact.display().to_string(),
            hash: digest.clone(),
            signature: signature.clone(),
            timestamp: Timestamp::now(),
            commit: self.revision.clone(),
            algorithm: self.signer.algorithm(),
        };

        let record_path = self.record_path(artifact);
        if let Some(parent) = record_path.parent() {
            fs::create_dir_all(parent).map_err(|err| StoreError::Io {
                path: parent.display().to_string(),
                detail: err.to_string(),
            })?;
        }
        write_json_atomic(&record_path, &record)?;

        Ok(AttestationOutcome {
            file: record.file,
            digest,
            signature,
        })
    }

    /// Verifies a single artifact against its stored record.
    ///
    /// All findings accumulate into the result; a missing record, a digest
    /// mismatch, and a signature mismatch are reported distinctly so the
    /// failing check is diagnosable.
    #[must_use]
    pub fn verify(&self, artifact: &Path) -> VerificationResult {
        let mut result = VerificationResult::new();
        let shown = artifact.display();

        let record_path = self.record_path(artifact);
        let record_bytes = match fs::read(&record_path) {
            Ok(bytes) => bytes,
            Err(_) => {
                result.error(format!("{shown}: no attestation found"));
                return result;
            }
        };
        let record: AttestationRecord = match serde_json::from_slice(&record_bytes) {
            Ok(record) => record,
            Err(err) => {
                result.error(format!("{shown}: attestation record malformed: {err}"));
                return result;
            }
        };

        let raw = match fs::read_to_string(artifact) {
            Ok(raw) => raw,
            Err(err) => {
                result.error(format!("{shown}: artifact unreadable: {err}"));
                return result;
            }
        };
        let current = self.signer.digest_content(&raw);
        if current != record.hash {
            result.error(format!("{shown}: digest mismatch (content changed since attestation)"));
        }

        if self.signer.has_key() {
            match record.signature.as_ref() {
                Some(signature) => match self.signer.verify_signature(&record.hash, signature) {
                    Ok(true) => {}
                    Ok(false) => result.error(format!("{shown}: signature mismatch")),
                    Err(err) => result.error(format!("{shown}: signature check failed: {err}")),
                },
                None => {
                    result.error(format!("{shown}: attestation record carries no signature"));
                }
            }
        } else if record.signature.is_some() {
            result.warning(format!("{shown}: signature present but no key configured; skipped"));
        }

        result
    }

    /// Attests every matching file under `root`, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SweepRoot`] when the root itself is unreadable;
    /// per-file failures are collected in the sweep instead.
    pub fn attest_directory(
        &self,
        root: &Path,
        allowed_extensions: &[&str],
    ) -> Result<AttestSweep, StoreError> {
        let mut sweep = AttestSweep::default();
        let files = collect_files(root, allowed_extensions, &mut sweep.failures)?;
        for file in files {
            match self.attest(&file) {
                Ok(outcome) => {
                    sweep.signatures.insert(outcome.file, outcome.signature);
                }
                Err(err) => sweep.failures.push(FileFailure {
                    file: file.display().to_string(),
                    reason: err.to_string(),
                }),
            }
        }
        Ok(sweep)
    }

    /// Verifies every matching file under `root`, continuing past failures.
    ///
    /// The sweep visits and reports on every file; any failure makes the
    /// aggregate fail without short-circuiting the traversal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SweepRoot`] when the root itself is unreadable.
    pub fn verify_directory(
        &self,
        root: &Path,
        allowed_extensions: &[&str],
    ) -> Result<VerifySweep, StoreError> {
        let mut sweep = VerifySweep::default();
        let mut walk_failures = Vec::new();
        let files = collect_files(root, allowed_extensions, &mut walk_failures)?;
        sweep.failures.extend(walk_failures);
        for file in files {
            let result = self.verify(&file);
            sweep.warnings.extend(result.warnings.iter().cloned());
            if result.passed() {
                sweep.passed.push(file.display().to_string());
            } else {
                for reason in result.errors {
                    sweep.failures.push(FileFailure {
                        file: file.display().to_string(),
                        reason,
                    });
                }
            }
        }
        Ok(sweep)
    }
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

/// Collects matching files under `root` in deterministic order.
///
/// Version-control and dependency-cache directories are skipped by name.
/// Unreadable subdirectories are recorded as failures without aborting.
fn collect_files(
    root: &Path,
    allowed_extensions: &[&str],
    failures: &mut Vec<FileFailure>,
) -> Result<Vec<PathBuf>, StoreError> {
    let entries = fs::read_dir(root).map_err(|err| StoreError::SweepRoot {
        path: root.display().to_string(),
        detail: err.to_string(),
    })?;

    let mut found = Vec::new();
    let mut children: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(err) => failures.push(FileFailure {
                file: root.display().to_string(),
                reason: format!("unreadable directory entry: {err}"),
            }),
        }
    }
    children.sort();

    for child in children {
        if child.is_dir() {
            if is_skipped_dir(&child) {
                continue;
            }
            match collect_files(&child, allowed_extensions, failures) {
                Ok(nested) => found.extend(nested),
                Err(err) => failures.push(FileFailure {
                    file: child.display().to_string(),
                    reason: err.to_string(),
                }),
            }
        } else if has_allowed_extension(&child, allowed_extensions) {
            found.push(child);
        }
    }
    Ok(found)
}

/// Returns true when a directory name is on the traversal skip list.
fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIP_DIRS.contains(&name))
}

/// Returns true when a file's extension is in the allow list.
fn has_allowed_extension(path: &Path, allowed_extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

// ============================================================================
// SECTION: Atomic Writes
// ============================================================================

/// Writes a JSON value through a temp file and rename.
///
/// The rename makes an overwrite all-or-nothing; readers never observe a
/// partially written record.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|err| StoreError::Io {
        path: path.display().to_string(),
        detail: format!("serialization failed: {err}"),
    })?;
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(TMP_SUFFIX);
    let tmp = PathBuf::from(tmp_name);
    fs::write(&tmp, &bytes).map_err(|err| StoreError::Io {
        path: tmp.display().to_string(),
        detail: err.to_string(),
    })?;
    fs::rename(&tmp, path).map_err(|err| StoreError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })
}
