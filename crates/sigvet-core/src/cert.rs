//! In-memory model of the certificates found in one signed file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{PublicKeyHash, Thumbprint};

/// Which chain within a signature a certificate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainRole {
    /// The certificate chain of the signature itself.
    Primary,
    /// The chain of the embedded timestamp counter-signature.
    Timestamp,
}

/// Which independent signature, and which of its chains, a certificate
/// was discovered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureOrigin {
    /// Zero-based index of the independent signature within the file.
    pub signature_index: usize,
    /// Chain role within that signature.
    pub role: ChainRole,
}

/// One certificate as found in a signature container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// First common-name component of the subject, or `None` when the
    /// subject carries no CN. This is the publisher identity used for
    /// matching, not the full subject.
    pub issuing_company_name: Option<String>,
    /// Full subject distinguished name, kept for diagnostics.
    pub subject: String,
    /// Digest over the whole DER certificate.
    pub thumbprint: Thumbprint,
    /// Digest over the subject public key bits only.
    pub public_key_hash: PublicKeyHash,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// Whether the certificate is self-signed. Extraction never emits
    /// root records; the flag is kept for records built elsewhere.
    pub is_root: bool,
    /// Where in the file's signatures this record was discovered.
    pub origin: SignatureOrigin,
}

impl CertificateRecord {
    /// `true` when `now` falls within the certificate's validity window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }
}

/// The ordered certificates extracted from one file.
///
/// Insertion order is discovery order: signature 0 primary chain,
/// signature 0 timestamp chain, signature 1 primary chain, and so on.
/// Root certificates are never included. The same certificate appears
/// once per signature it participates in; occurrences are not
/// de-duplicated because the origin tag matters for diagnostics.
///
/// A set is built fresh per verification call and discarded afterwards;
/// nothing is cached across calls because the file can change between
/// checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateSet {
    records: Vec<CertificateRecord>,
}

impl CertificateSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, preserving discovery order.
    pub fn push(&mut self, record: CertificateRecord) {
        self.records.push(record);
    }

    /// Number of records in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the records in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, CertificateRecord> {
        self.records.iter()
    }

    /// All records in discovery order.
    #[must_use]
    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a CertificateSet {
    type Item = &'a CertificateRecord;
    type IntoIter = std::slice::Iter<'a, CertificateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
