//! Composition of trust evaluation, chain extraction, and publisher
//! matching into the externally used verification surface.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use sigvet_core::cert::{CertificateRecord, CertificateSet};
use sigvet_core::matcher::find_first_match;
use sigvet_core::policy::PublisherPolicy;

use crate::decode::SignatureDecoder;
use crate::error::{DecodeError, VerifyError};
use crate::extract::extract_all;
use crate::trust::{TrustPolicy, TrustProvider, TrustVerdict};

/// Verifies signed files against explicit trust and publisher policies.
///
/// Stateless: every call re-reads the file's signatures (the file can
/// change between checks), so calls are independently reentrant and
/// safe to issue concurrently for different files. Nothing is cached
/// and nothing is retried — verification is deterministic over static
/// file content.
pub struct FileVerifier {
    decoder: Arc<dyn SignatureDecoder>,
    trust: Arc<dyn TrustProvider>,
}

impl FileVerifier {
    /// Create a verifier over the given collaborators.
    pub fn new(decoder: Arc<dyn SignatureDecoder>, trust: Arc<dyn TrustProvider>) -> Self {
        Self { decoder, trust }
    }

    /// Create a verifier over the real platform collaborators, with
    /// online revocation checks enabled.
    #[cfg(windows)]
    #[must_use]
    pub fn platform() -> Self {
        Self::new(
            Arc::new(crate::platform::crypt::CryptDecoder::new()),
            Arc::new(crate::platform::wintrust::WinTrustProvider::new(true)),
        )
    }

    /// Ask the platform whether the file's signature chains to an
    /// acceptable root, and normalize the answer.
    ///
    /// Orthogonal to [`Self::verify_publisher`]: a trusted chain says
    /// nothing about *whose* chain it is. Callers that need both call
    /// both and combine the results.
    pub fn verify_trust(&self, path: &Path, policy: &TrustPolicy) -> TrustVerdict {
        let native = self.trust.verify_file(path, policy);
        let verdict = TrustVerdict::from_native(native);
        debug!(
            "trust verdict for {}: {:?} (native {native:#010x})",
            path.display(),
            verdict.status
        );
        verdict
    }

    /// Extract the full certificate set of `path`, for tooling and
    /// diagnostics that need more than a boolean.
    ///
    /// An unsigned file yields an empty set; absence of a signature is
    /// not a fault at this surface.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when a container is present
    /// but unparseable — never silently treated as absent — and
    /// [`DecodeError::Io`] when the file cannot be read.
    pub fn extract_all(&self, path: &Path) -> Result<CertificateSet, DecodeError> {
        match extract_all(self.decoder.as_ref(), path) {
            Err(DecodeError::NoSignature) => Ok(CertificateSet::new()),
            other => other,
        }
    }

    /// Find the first certificate of `path` satisfying `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::PolicyMismatch`] when extraction
    /// succeeded but no certificate satisfied the policy, and
    /// [`VerifyError::Decode`] when extraction itself failed —
    /// including [`DecodeError::NoSignature`] for unsigned files, which
    /// stays distinguishable from a wrong-publisher rejection.
    pub fn verify_publisher(
        &self,
        path: &Path,
        policy: &PublisherPolicy,
    ) -> Result<CertificateRecord, VerifyError> {
        let set = extract_all(self.decoder.as_ref(), path)?;
        match find_first_match(&set, policy) {
            Some(record) => Ok(record.clone()),
            None => {
                info!(
                    "no certificate in {} matched publisher '{}'",
                    path.display(),
                    policy.company_name
                );
                Err(VerifyError::PolicyMismatch {
                    expected: policy.company_name.clone(),
                })
            }
        }
    }

    /// `true` when `path` is signed by `company_name` under the given
    /// flags. Convenience over [`Self::verify_publisher`] for callers
    /// that only need a yes/no answer.
    #[must_use]
    pub fn is_signed_by(
        &self,
        path: &Path,
        company_name: &str,
        allow_test_variant: bool,
        check_validity_now: bool,
    ) -> bool {
        let mut policy = PublisherPolicy::new(company_name);
        policy.allow_test_variant = allow_test_variant;
        policy.check_validity_now = check_validity_now;
        self.verify_publisher(path, &policy).is_ok()
    }
}
