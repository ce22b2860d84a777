// crates/provenance-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Provenance Gate Identifiers
// Description: Canonical opaque identifiers for attestations and receipts.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Provenance Gate. Identifiers are opaque and serialize as strings.
//! Validation is handled at runtime boundaries rather than within these
//! simple wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Version-control revision identifier scoped to attestation records.
///
/// Falls back to `"local"` when no version-control source is available.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Fallback revision when version control is unavailable.
    pub const LOCAL: &'static str = "local";

    /// Creates a new revision identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the fallback revision identifier.
    #[must_use]
    pub fn local() -> Self {
        Self(Self::LOCAL.to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RevisionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RevisionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Blueprint identifier tying receipts to their generation input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlueprintId(String);

impl BlueprintId {
    /// Creates a new blueprint identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlueprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BlueprintId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BlueprintId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Storage key for a generation receipt (input digest prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptKey(String);

impl ReceiptKey {
    /// Creates a new receipt key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ReceiptKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ReceiptKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
