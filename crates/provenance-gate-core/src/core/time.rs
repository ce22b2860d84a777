// crates/provenance-gate-core/src/core/time.rs
// ============================================================================
// Module: Provenance Gate Time Model
// Description: Canonical UTC timestamps for attestation and receipt records.
// Purpose: Provide RFC 3339 serialized time values across Provenance Gate records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Provenance Gate records carry explicit UTC timestamps serialized as
//! RFC 3339 strings. Receipts are ordered by these values when
//! reproducibility checks pick the two most recent generation runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical UTC timestamp used in Provenance Gate records.
///
/// # Invariants
/// - Always serialized as an RFC 3339 string in UTC.
/// - Ordering follows the underlying instant; no monotonicity is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Returns the current wall-clock time in UTC.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an explicit datetime value.
    #[must_use]
    pub const fn from_datetime(value: OffsetDateTime) -> Self {
        Self(value)
    }

    /// Returns the underlying datetime value.
    #[must_use]
    pub const fn as_datetime(&self) -> OffsetDateTime {
        self.0
    }

    /// Converts a filesystem modification time into a timestamp.
    #[must_use]
    pub fn from_system_time(value: SystemTime) -> Self {
        Self(OffsetDateTime::from(value))
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        Self::from_system_time(value)
    }
}
