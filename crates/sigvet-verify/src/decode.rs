//! The signature-container decoder seam and its in-memory fixture.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::DecodeError;

/// One certificate as it appears in a signature container, before any
/// modeling or policy is applied.
#[derive(Debug, Clone)]
pub struct RawCertificate {
    /// Rendered subject distinguished name.
    pub subject: String,
    /// Rendered issuer distinguished name.
    pub issuer: String,
    /// Validity window start.
    pub not_before: DateTime<Utc>,
    /// Validity window end.
    pub not_after: DateTime<Utc>,
    /// The whole DER-encoded certificate.
    pub der: Vec<u8>,
    /// The subject public key bits.
    pub public_key: Vec<u8>,
}

impl RawCertificate {
    /// `true` when the certificate is self-signed, i.e. subject and
    /// issuer name are identical.
    #[must_use]
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }
}

/// One independent signature found in a file.
#[derive(Debug, Clone, Default)]
pub struct DecodedSignature {
    /// Certificate chain of the signature itself, leaf first.
    pub chain: Vec<RawCertificate>,
    /// Chain of the embedded timestamp counter-signature; empty when
    /// the signature carries no timestamp.
    pub timestamp_chain: Vec<RawCertificate>,
}

/// Decodes the signature container(s) of a file into certificate
/// chains.
///
/// Implementations only parse structure; they make no trust judgment.
/// A file may carry more than one independent signature (dual signing
/// with a legacy and a modern digest algorithm).
pub trait SignatureDecoder: Send + Sync {
    /// Return every independent signature present in `path`, in the
    /// order the container lists them.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NoSignature`] when the file carries no
    /// signature container, [`DecodeError::Malformed`] when a container
    /// is present but unparseable, and [`DecodeError::Io`] when the
    /// file cannot be read.
    fn decode(&self, path: &Path) -> Result<Vec<DecodedSignature>, DecodeError>;
}

#[derive(Debug, Clone)]
enum Fixture {
    Signed(Vec<DecodedSignature>),
    Malformed(String),
}

/// An in-memory [`SignatureDecoder`] for deterministic tests.
///
/// Paths map to pre-decoded signatures; unknown paths read as unsigned
/// files.
#[derive(Debug, Default)]
pub struct InMemoryDecoder {
    files: HashMap<PathBuf, Fixture>,
}

impl InMemoryDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as a signed file carrying `signatures`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, signatures: Vec<DecodedSignature>) {
        self.files.insert(path.into(), Fixture::Signed(signatures));
    }

    /// Register `path` as carrying an unparseable signature container.
    pub fn insert_malformed(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) {
        self.files.insert(path.into(), Fixture::Malformed(reason.into()));
    }
}

impl SignatureDecoder for InMemoryDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<DecodedSignature>, DecodeError> {
        match self.files.get(path) {
            Some(Fixture::Signed(signatures)) => Ok(signatures.clone()),
            Some(Fixture::Malformed(reason)) => Err(DecodeError::Malformed(reason.clone())),
            None => Err(DecodeError::NoSignature),
        }
    }
}
