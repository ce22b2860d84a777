// crates/provenance-gate-core/src/runtime/signer.rs
// ============================================================================
// Module: Provenance Gate Signing Service
// Description: Keyed HMAC-SHA256 signatures over content digests.
// Purpose: Produce and verify signatures, degrading to digest-only mode.
// Dependencies: crate::{core, interfaces}, hmac, sha2, subtle
// ============================================================================

//! ## Overview
//! The signing service signs the UTF-8 bytes of a hex digest with
//! HMAC-SHA256 under the process-wide secret key. Key absence is a
//! first-class state: `has_key` exposes it and callers branch into
//! digest-only attestation rather than treating it as an error deep in the
//! stack. Signature verification recomputes the tag and compares in
//! constant time.
//!
//! Security posture: minimize timing side-channels when comparing signature
//! material; never log or debug-print key bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;
use std::time::Duration;

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::hashing::ContentDigest;
use crate::core::hashing::DEFAULT_HASH_ALGORITHM;
use crate::core::hashing::HashAlgorithm;
use crate::core::hashing::Signature;
use crate::core::hashing::digest_text;
use crate::core::hashing::hex_encode;
use crate::core::identifiers::RevisionId;
use crate::core::normalize::normalize;
use crate::interfaces::CommandExecutor;
use crate::interfaces::RevisionSource;
use crate::interfaces::SecretKey;
use crate::interfaces::SecretKeyProvider;

/// HMAC-SHA256 instantiation used for all signatures.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the signing key.
pub const SIGNING_KEY_ENV: &str = "PROVENANCE_GATE_SIGNING_KEY";

/// Timeout applied to the revision lookup command.
const REVISION_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Signing service errors.
#[derive(Debug, Error)]
pub enum SignError {
    /// A signature was requested but no key is configured.
    #[error("signing key required but absent; run in digest-only mode")]
    KeyMissing,
    /// The configured key was rejected by the MAC implementation.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

// ============================================================================
// SECTION: Signing Service
// ============================================================================

/// Digest and signature service with an optional process-wide key.
#[derive(Debug, Clone)]
pub struct SigningService {
    /// Hash algorithm used for content digests.
    algorithm: HashAlgorithm,
    /// Signing key; absent in unkeyed mode.
    key: Option<SecretKey>,
}

impl SigningService {
    /// Creates a service with an explicit key state.
    #[must_use]
    pub const fn new(algorithm: HashAlgorithm, key: Option<SecretKey>) -> Self {
        Self {
            algorithm,
            key,
        }
    }

    /// Creates a service resolving its key through a provider once.
    #[must_use]
    pub fn from_provider(provider: &dyn SecretKeyProvider) -> Self {
        Self::new(DEFAULT_HASH_ALGORITHM, provider.key())
    }

    /// Creates an unkeyed service for digest-only attestation.
    #[must_use]
    pub const fn unkeyed() -> Self {
        Self::new(DEFAULT_HASH_ALGORITHM, None)
    }

    /// Returns the hash algorithm in use.
    #[must_use]
    pub const fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Returns true when a signing key is configured.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Normalizes and digests artifact text.
    #[must_use]
    pub fn digest_content(&self, raw: &str) -> ContentDigest {
        digest_text(self.algorithm, &normalize(raw))
    }

    /// Signs a digest with the configured key.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::KeyMissing`] in unkeyed mode; callers must
    /// branch on [`Self::has_key`] first.
    pub fn sign(&self, digest: &ContentDigest) -> Result<Signature, SignError> {
        let key = self.key.as_ref().ok_or(SignError::KeyMissing)?;
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|err| SignError::InvalidKey(err.to_string()))?;
        mac.update(digest.as_str().as_bytes());
        let tag = mac.finalize().into_bytes();
        Ok(Signature::new(hex_encode(&tag)))
    }

    /// Verifies a signature by recomputation and constant-time comparison.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::KeyMissing`] in unkeyed mode.
    pub fn verify_signature(
        &self,
        digest: &ContentDigest,
        signature: &Signature,
    ) -> Result<bool, SignError> {
        let expected = self.sign(digest)?;
        let equal: bool =
            expected.as_str().as_bytes().ct_eq(signature.as_str().as_bytes()).into();
        Ok(equal)
    }
}

// ============================================================================
// SECTION: Environment Key Provider
// ============================================================================

/// Key provider reading the signing key from the environment once.
#[derive(Debug, Default)]
pub struct EnvKeyProvider {
    /// Cached lookup result; resolved lazily on first use.
    cached: OnceLock<Option<SecretKey>>,
}

impl EnvKeyProvider {
    /// Creates a provider for [`SIGNING_KEY_ENV`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cached: OnceLock::new(),
        }
    }
}

impl SecretKeyProvider for EnvKeyProvider {
    fn key(&self) -> Option<SecretKey> {
        self.cached
            .get_or_init(|| {
                std::env::var(SIGNING_KEY_ENV)
                    .ok()
                    .filter(|value| !value.is_empty())
                    .map(|value| SecretKey::new(value.into_bytes()))
            })
            .clone()
    }
}

// ============================================================================
// SECTION: Revision Sources
// ============================================================================

/// Revision source shelling out to version control.
#[derive(Debug)]
pub struct GitRevisionSource<E: CommandExecutor> {
    /// Executor used for the lookup command.
    executor: E,
}

impl<E: CommandExecutor> GitRevisionSource<E> {
    /// Creates a revision source backed by the given executor.
    #[must_use]
    pub const fn new(executor: E) -> Self {
        Self {
            executor,
        }
    }
}

impl<E: CommandExecutor> RevisionSource for GitRevisionSource<E> {
    fn revision(&self) -> RevisionId {
        let lookup = self.executor.run("git rev-parse --short HEAD", REVISION_LOOKUP_TIMEOUT);
        match lookup {
            Ok(output) if output.success() => {
                let trimmed = output.stdout.trim();
                if trimmed.is_empty() {
                    RevisionId::local()
                } else {
                    RevisionId::new(trimmed)
                }
            }
            Ok(_) | Err(_) => RevisionId::local(),
        }
    }
}

/// Fixed revision source for tests and offline use.
#[derive(Debug, Clone)]
pub struct StaticRevisionSource(
    /// Revision returned on every lookup.
    pub RevisionId,
);

impl RevisionSource for StaticRevisionSource {
    fn revision(&self) -> RevisionId {
        self.0.clone()
    }
}
