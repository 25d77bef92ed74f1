//! Error types for signature decoding and publisher verification.

use thiserror::Error;

/// Errors from walking a file's signature container.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file has no recognizable signature container.
    #[error("no signature container present")]
    NoSignature,
    /// A container is present but cannot be parsed.
    #[error("malformed signature container: {0}")]
    Malformed(String),
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the publisher verification facade.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Extraction failed before any matching could happen.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Extraction succeeded but no certificate satisfied the policy.
    ///
    /// The common "wrong publisher" rejection path; kept distinct from
    /// parse and I/O failures so callers can log it as a policy
    /// decision rather than a fault.
    #[error("no certificate matched publisher policy for '{expected}'")]
    PolicyMismatch {
        /// The publisher name the policy expected.
        expected: String,
    },
}
