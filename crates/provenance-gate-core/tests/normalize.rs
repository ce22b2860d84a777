// crates/provenance-gate-core/tests/normalize.rs
// ============================================================================
// Module: Normalizer Tests
// Description: Tests for content normalization and annotation stripping.
// Purpose: Validate idempotence and hash-annotation removal.
// ============================================================================
//! ## Overview
//! Validates that normalization is idempotent, strips hash self-annotations
//! in any comment syntax, and unifies CRLF line endings.

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

use proptest::prelude::*;
use provenance_gate_core::core::is_hash_annotation;
use provenance_gate_core::core::normalize;

// ============================================================================
// SECTION: Line Endings
// ============================================================================

/// Tests CRLF sequences are converted to LF.
#[test]
fn test_normalize_unifies_crlf() {
    assert_eq!(normalize("a\r\nb\r\nc"), "a\nb\nc");
}

/// Tests empty input is valid and maps to itself.
#[test]
fn test_normalize_empty_string() {
    assert_eq!(normalize(""), "");
}

// ============================================================================
// SECTION: Hash Annotations
// ============================================================================

/// Tests a hash annotation line is removed entirely, not replaced.
#[test]
fn test_normalize_removes_hash_annotation_line() {
    let raw = "title\nhash: abc123def456\nbody";
    assert_eq!(normalize(raw), "title\nbody");
}

/// Tests the normalized form is stable regardless of the annotation value.
#[test]
fn test_normalize_is_stable_across_annotation_values() {
    let with_old = "doc\n<!-- hash: 0000aaaa -->\ntail";
    let with_new = "doc\n<!-- hash: ffff1234 -->\ntail";
    assert_eq!(normalize(with_old), normalize(with_new));
}

/// Tests annotation recognition across comment syntaxes.
#[test]
fn test_hash_annotation_comment_syntaxes() {
    assert!(is_hash_annotation("hash: deadbeef"));
    assert!(is_hash_annotation("# hash: deadbeef"));
    assert!(is_hash_annotation("// hash: deadbeef"));
    assert!(is_hash_annotation("; hash: deadbeef"));
    assert!(is_hash_annotation("<!-- hash: deadbeef -->"));
    assert!(is_hash_annotation("hash:"));
    assert!(is_hash_annotation("hash: UNSIGNED"));
}

/// Tests ordinary lines are never classified as annotations.
#[test]
fn test_hash_annotation_rejects_ordinary_lines() {
    assert!(!is_hash_annotation("the hash: of this file is important"));
    assert!(!is_hash_annotation("hash: not-hex-at-all!"));
    assert!(!is_hash_annotation("hashing: deadbeef"));
    assert!(!is_hash_annotation(""));
}

// ============================================================================
// SECTION: Idempotence
// ============================================================================

/// Tests double normalization equals single normalization for fixed cases.
#[test]
fn test_normalize_idempotent_fixed_cases() {
    let cases = [
        "",
        "plain text",
        "a\r\nhash: abcd\r\nb",
        "hash: 1234\nhash: 5678",
        "trailing newline\n",
        "\r\n\r\n",
    ];
    for raw in cases {
        let once = normalize(raw);
        assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
    }
}

proptest! {
    /// Tests normalization is idempotent for arbitrary strings.
    #[test]
    fn prop_normalize_idempotent(raw in ".*") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Tests normalized output never retains CRLF sequences.
    #[test]
    fn prop_normalize_removes_crlf(raw in ".*") {
        prop_assert!(!normalize(&raw).contains("\r\n"));
    }
}
