// crates/provenance-gate-core/src/core/normalize.rs
// ============================================================================
// Module: Provenance Gate Content Normalizer
// Description: Canonical text normalization for stable artifact hashing.
// Purpose: Strip self-referential hash annotations and unify line endings.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Artifacts may embed a line declaring their own digest. Hashing such a line
//! would make the digest depend on itself, so normalization removes every
//! hash self-annotation before the digest is computed and unifies CRLF line
//! endings to LF. Normalization is a pure, total function: any string is
//! valid input and normalizing twice yields the same bytes as normalizing
//! once.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Comment markers stripped before matching a hash annotation.
const COMMENT_PREFIXES: &[&str] = &["<!--", "//", "#", ";"];

/// Closing marker stripped from the end of a candidate annotation line.
const COMMENT_SUFFIX: &str = "-->";

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes artifact text for stable hashing.
///
/// Converts CRLF to LF and removes every hash self-annotation line entirely,
/// so the normalized form is identical no matter what value the annotation
/// previously held.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut unified = raw.replace("\r\n", "\n");
    // Collapse to a fixpoint; a single pass leaves "\r\r\n" as "\r\n".
    while unified.contains("\r\n") {
        unified = unified.replace("\r\n", "\n");
    }
    let mut out = String::with_capacity(unified.len());
    let mut first = true;
    for line in unified.split('\n') {
        if is_hash_annotation(line) {
            continue;
        }
        if !first {
            out.push('\n');
        }
        out.push_str(line);
        first = false;
    }
    out
}

/// Returns true when a line declares the artifact's own digest.
///
/// A hash annotation is a line of the form `hash: <value>` where `<value>`
/// is empty, hexadecimal, or an `unsigned` placeholder. Leading comment
/// markers and a trailing `-->` are ignored so annotations survive in any
/// comment syntax. Classification never inspects the digest about to be
/// produced.
#[must_use]
pub fn is_hash_annotation(line: &str) -> bool {
    let mut rest = line.trim();
    for prefix in COMMENT_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped.trim_start();
            break;
        }
    }
    if let Some(stripped) = rest.strip_suffix(COMMENT_SUFFIX) {
        rest = stripped.trim_end();
    }
    let Some(value) = rest.strip_prefix("hash:") else {
        return false;
    };
    let value = value.trim();
    value.is_empty()
        || value.eq_ignore_ascii_case("unsigned")
        || value.chars().all(|ch| ch.is_ascii_hexdigit())
}
