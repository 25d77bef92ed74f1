//! Validated newtype wrappers for certificate digest identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Error returned when a digest value fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value is empty.
    #[error("value must not be empty")]
    Empty,
    /// The hex string is not a recognized digest length.
    #[error("expected 40 or 64 hex characters, got {0}")]
    InvalidHexLength(usize),
    /// The hex string contains non-hex characters.
    #[error("value contains non-hex characters")]
    InvalidHex,
}

fn validate_hex(value: &str) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty);
    }
    if value.len() != 40 && value.len() != 64 {
        return Err(ValidationError::InvalidHexLength(value.len()));
    }
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHex);
    }
    Ok(value.to_ascii_lowercase())
}

/// Hex digest over a whole DER-encoded certificate.
///
/// SHA-1, the platform thumbprint convention; identifies one exact
/// certificate. Legacy tooling prints 40 hex characters, SHA-256-based
/// tooling prints 64, so both lengths parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Parse a `Thumbprint` from a hex string, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the string is empty, not 40 or 64
    /// characters, or contains non-hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        Ok(Self(validate_hex(hex)?))
    }

    /// Compute the thumbprint of a DER-encoded certificate.
    #[must_use]
    pub fn of_der(der: &[u8]) -> Self {
        Self(hex::encode(Sha1::digest(der)))
    }

    /// Return the lowercase hex string representation.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex digest over only the subject public key bits (SHA-256).
///
/// Survives re-issuance: a publisher that renews its certificate under
/// the same key pair keeps the same public-key hash while the
/// [`Thumbprint`] changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKeyHash(String);

impl PublicKeyHash {
    /// Parse a `PublicKeyHash` from a hex string, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the string is empty, not 40 or 64
    /// characters, or contains non-hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        Ok(Self(validate_hex(hex)?))
    }

    /// Compute the hash of a certificate's subject public key bits.
    #[must_use]
    pub fn of_key(public_key: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(public_key)))
    }

    /// Return the lowercase hex string representation.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
