// crates/provenance-gate-core/src/runtime/ledger.rs
// ============================================================================
// Module: Provenance Gate Receipt Ledger
// Description: Deterministic-generation receipts and reproducibility checks.
// Purpose: Record generation transactions and certify bit-exact reproduction.
// Dependencies: crate::{core, runtime::signer, runtime::store}, serde
// ============================================================================

//! ## Overview
//! The receipt ledger persists one JSON file per generation receipt, named
//! by the 16-character prefix of the canonical input digest plus a run
//! sequence so repeated runs of the same inputs coexist. Reproducibility
//! compares the two most recent receipts for a blueprint: their input
//! digests must match, and the digest of the *current* output file must
//! equal the *older* receipt's stored output digest. The comparison is
//! asymmetric on purpose: it certifies that repeating the same inputs, at a
//! later time, regenerates byte-identical output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::canonical_json;
use crate::core::hashing::digest_text;
use crate::core::identifiers::BlueprintId;
use crate::core::identifiers::ReceiptKey;
use crate::core::normalize::normalize;
use crate::core::receipt::BlueprintIdentity;
use crate::core::receipt::ExecutionParams;
use crate::core::receipt::GenerationReceipt;
use crate::core::receipt::ValidationOutcomes;
use crate::core::time::Timestamp;
use crate::runtime::signer::SigningService;
use crate::runtime::store::write_json_atomic;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Receipt ledger errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger I/O failed.
    #[error("receipt ledger io error at {path}: {detail}")]
    Io {
        /// Path the operation failed on.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// Canonical input serialization failed.
    #[error("failed to canonicalize generation inputs: {0}")]
    Canonicalization(String),
    /// A stored receipt fails to parse its expected shape.
    #[error("receipt corrupt at {path}: {detail}")]
    Corrupt {
        /// Receipt file path.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// No receipt exists for the requested key.
    #[error("no receipt found for key {0}")]
    NotFound(ReceiptKey),
}

// ============================================================================
// SECTION: Reproducibility Outcome
// ============================================================================

/// Non-exceptional outcome of a reproducibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReproducibilityOutcome {
    /// Whether bit-exact reproduction was confirmed.
    pub reproduced: bool,
    /// Human-readable reason for the outcome.
    pub detail: String,
}

impl ReproducibilityOutcome {
    /// Builds a negative outcome with a reason.
    fn not_reproduced(detail: impl Into<String>) -> Self {
        Self {
            reproduced: false,
            detail: detail.into(),
        }
    }
}

// ============================================================================
// SECTION: Canonical Input Material
// ============================================================================

/// Generation inputs canonicalized for the input digest.
#[derive(Debug, Serialize)]
struct InputMaterial<'a> {
    /// Raw blueprint content.
    blueprint: &'a str,
    /// Random seed.
    seed: u64,
    /// Sampling temperature.
    temperature: f64,
    /// Generation mode label.
    mode: &'a str,
}

// ============================================================================
// SECTION: Receipt Ledger
// ============================================================================

/// Filesystem-backed generation receipt ledger.
#[derive(Debug, Clone)]
pub struct ReceiptLedger {
    /// Directory holding one JSON file per receipt.
    root: PathBuf,
    /// Digest service shared with the attestation chain.
    signer: SigningService,
}

impl ReceiptLedger {
    /// Creates a ledger rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, signer: SigningService) -> Self {
        Self {
            root: root.into(),
            signer,
        }
    }

    /// Opens a generation transaction and persists the initial receipt.
    ///
    /// The input digest covers the canonical JSON of blueprint content,
    /// seed, temperature, and mode. The receipt starts with no output digest
    /// and `reproduced` false. A run of the same inputs appends a new
    /// receipt under the same key rather than merging into the old one.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when canonicalization or persistence fails.
    pub fn begin_generation(
        &self,
        blueprint_content: &str,
        blueprint: BlueprintIdentity,
        params: ExecutionParams,
        model_version: &str,
    ) -> Result<GenerationReceipt, LedgerError> {
        let material = InputMaterial {
            blueprint: blueprint_content,
            seed: params.seed,
            temperature: params.temperature,
            mode: &params.mode,
        };
        let canonical =
            canonical_json(&material).map_err(|err| LedgerError::Canonicalization(err.to_string()))?;
        let input_digest = digest_text(self.signer.algorithm(), &normalize(&canonical));

        let receipt = GenerationReceipt {
            input_digest,
            model_version: model_version.to_string(),
            output_digest: None,
            output_path: None,
            timestamp: Timestamp::now(),
            reproduced: false,
            blueprint,
            params,
            validation: ValidationOutcomes::default(),
        };

        fs::create_dir_all(&self.root).map_err(|err| LedgerError::Io {
            path: self.root.display().to_string(),
            detail: err.to_string(),
        })?;
        let next_seq = self
            .receipt_files(&receipt.key())?
            .iter()
            .filter_map(|path| parse_seq(path))
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let path = self.receipt_path(&receipt.key(), next_seq);
        write_json_atomic(&path, &receipt).map_err(|err| LedgerError::Io {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        Ok(receipt)
    }

    /// Attaches the output digest once the generated artifact is known.
    ///
    /// Updates the most recent receipt stored under the key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the receipt is missing or the output
    /// artifact cannot be read.
    pub fn attach_output(
        &self,
        key: &ReceiptKey,
        output_path: &Path,
    ) -> Result<GenerationReceipt, LedgerError> {
        let (mut receipt, path) = self.load_newest(key)?;
        let raw = fs::read_to_string(output_path).map_err(|err| LedgerError::Io {
            path: output_path.display().to_string(),
            detail: err.to_string(),
        })?;
        receipt.output_digest = Some(self.signer.digest_content(&raw));
        receipt.output_path = Some(output_path.display().to_string());
        self.overwrite(&path, &receipt)?;
        Ok(receipt)
    }

    /// Attaches build, test, and lint validation outcomes.
    ///
    /// Does not change the reproduced flag.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the receipt is missing or persistence
    /// fails.
    pub fn attach_validation(
        &self,
        key: &ReceiptKey,
        build_passed: bool,
        tests_passed: bool,
        lint_passed: bool,
    ) -> Result<GenerationReceipt, LedgerError> {
        let (mut receipt, path) = self.load_newest(key)?;
        receipt.validation.build = Some(build_passed);
        receipt.validation.test = Some(tests_passed);
        receipt.validation.lint = Some(lint_passed);
        self.overwrite(&path, &receipt)?;
        Ok(receipt)
    }

    /// Checks whether the two most recent runs for a blueprint reproduced.
    ///
    /// Requires at least two receipts. Their input digests must match, and
    /// the digest of the current output file must equal the older receipt's
    /// stored output digest; on success the newer receipt's reproduced flag
    /// is persisted as true. Every shortfall yields a reasoned outcome, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] only for structural or I/O failures of the
    /// ledger itself.
    pub fn check_reproducibility(
        &self,
        blueprint_path: &str,
    ) -> Result<ReproducibilityOutcome, LedgerError> {
        let mut entries: Vec<(GenerationReceipt, PathBuf)> = self
            .list_with_paths(None)?
            .into_iter()
            .filter(|(receipt, _)| receipt.blueprint.path == blueprint_path)
            .collect();
        // list order is creation order; a stable sort on timestamp keeps it
        // as the tie-breaker for receipts created within the same instant.
        entries.sort_by(|a, b| a.0.timestamp.cmp(&b.0.timestamp));

        if entries.len() < 2 {
            return Ok(ReproducibilityOutcome::not_reproduced(
                "need at least two receipts for this blueprint",
            ));
        }
        let Some((mut newer, newer_path)) = entries.pop() else {
            return Ok(ReproducibilityOutcome::not_reproduced("need at least two receipts"));
        };
        let Some((older, _)) = entries.pop() else {
            return Ok(ReproducibilityOutcome::not_reproduced("need at least two receipts"));
        };

        if newer.input_digest != older.input_digest {
            return Ok(ReproducibilityOutcome::not_reproduced(
                "input mismatch between the two most recent receipts",
            ));
        }

        let Some(expected) = older.output_digest.as_ref() else {
            return Ok(ReproducibilityOutcome::not_reproduced(
                "previous receipt has no stored output digest",
            ));
        };
        let output_path = newer.output_path.clone().or_else(|| older.output_path.clone());
        let Some(output_path) = output_path else {
            return Ok(ReproducibilityOutcome::not_reproduced("output not found"));
        };
        let Ok(raw) = fs::read_to_string(&output_path) else {
            return Ok(ReproducibilityOutcome::not_reproduced("output not found"));
        };

        let current = self.signer.digest_content(&raw);
        if current != *expected {
            return Ok(ReproducibilityOutcome::not_reproduced(
                "output digest mismatch against previous receipt",
            ));
        }

        newer.reproduced = true;
        self.overwrite(&newer_path, &newer)?;
        Ok(ReproducibilityOutcome {
            reproduced: true,
            detail: "bit-exact reproduction confirmed".to_string(),
        })
    }

    /// Lists receipts in storage order, optionally filtered by blueprint.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger directory is unreadable or a
    /// stored receipt fails to parse.
    pub fn list(&self, filter: Option<&BlueprintId>) -> Result<Vec<GenerationReceipt>, LedgerError> {
        Ok(self.list_with_paths(filter)?.into_iter().map(|(receipt, _)| receipt).collect())
    }

    /// Loads the most recent receipt stored under a key.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when no receipt exists for the key.
    pub fn load(&self, key: &ReceiptKey) -> Result<GenerationReceipt, LedgerError> {
        Ok(self.load_newest(key)?.0)
    }

    /// Returns the on-disk path for a receipt key and run sequence.
    #[must_use]
    pub fn receipt_path(&self, key: &ReceiptKey, seq: usize) -> PathBuf {
        self.root.join(format!("{}-{seq:04}.json", key.as_str()))
    }

    /// Lists receipts with their on-disk paths in storage order.
    fn list_with_paths(
        &self,
        filter: Option<&BlueprintId>,
    ) -> Result<Vec<(GenerationReceipt, PathBuf)>, LedgerError> {
        let mut paths = self.ledger_files()?;
        paths.sort();

        let mut receipts = Vec::with_capacity(paths.len());
        for path in paths {
            let receipt = self.read_receipt(&path)?;
            if filter.is_none_or(|id| receipt.blueprint.id == *id) {
                receipts.push((receipt, path));
            }
        }
        Ok(receipts)
    }

    /// Loads the receipt file with the highest run sequence for a key.
    fn load_newest(&self, key: &ReceiptKey) -> Result<(GenerationReceipt, PathBuf), LedgerError> {
        let files = self.receipt_files(key)?;
        let newest = files.into_iter().max_by_key(|path| parse_seq(path).unwrap_or(0));
        let Some(path) = newest else {
            return Err(LedgerError::NotFound(key.clone()));
        };
        let receipt = self.read_receipt(&path)?;
        Ok((receipt, path))
    }

    /// Returns every receipt file stored under a key.
    fn receipt_files(&self, key: &ReceiptKey) -> Result<Vec<PathBuf>, LedgerError> {
        let prefix = format!("{}-", key.as_str());
        Ok(self
            .ledger_files()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .collect())
    }

    /// Returns every receipt file in the ledger directory.
    fn ledger_files(&self) -> Result<Vec<PathBuf>, LedgerError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(LedgerError::Io {
                    path: self.root.display().to_string(),
                    detail: err.to_string(),
                });
            }
        };
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| LedgerError::Io {
                path: self.root.display().to_string(),
                detail: err.to_string(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Reads and parses one receipt file.
    fn read_receipt(&self, path: &Path) -> Result<GenerationReceipt, LedgerError> {
        let bytes = fs::read(path).map_err(|err| LedgerError::Io {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| LedgerError::Corrupt {
            path: path.display().to_string(),
            detail: err.to_string(),
        })
    }

    /// Overwrites a receipt file atomically.
    fn overwrite(&self, path: &Path, receipt: &GenerationReceipt) -> Result<(), LedgerError> {
        write_json_atomic(path, receipt).map_err(|err| LedgerError::Io {
            path: path.display().to_string(),
            detail: err.to_string(),
        })
    }
}

// ============================================================================
// SECTION: File Name Helpers
// ============================================================================

/// Parses the run sequence out of a receipt file name.
///
/// Sequences are compared numerically; counting files would re-issue a
/// sequence after an out-of-band deletion, and lexicographic ordering breaks
/// once the sequence outgrows its zero padding.
fn parse_seq(path: &Path) -> Option<usize> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit_once('-'))
        .and_then(|(_, seq)| seq.parse().ok())
}
