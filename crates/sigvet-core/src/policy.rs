//! Publisher-matching policy values.

use serde::{Deserialize, Serialize};

use crate::types::{PublicKeyHash, Thumbprint};

/// Name suffix of the internal test-signing certificate variant.
pub const TEST_VARIANT_SUFFIX: &str = " (TEST)";

/// What the expected publisher of a signed file looks like.
///
/// A policy is an explicit value built by the caller and passed in; no
/// ambient or global configuration is consulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherPolicy {
    /// Expected publisher name, compared case-sensitively against the
    /// first CN of each candidate subject.
    pub company_name: String,
    /// When set, the matching certificate's thumbprint must equal this.
    pub thumbprint: Option<Thumbprint>,
    /// When set, the matching certificate's public-key hash must equal
    /// this.
    pub public_key_hash: Option<PublicKeyHash>,
    /// Also accept the ` (TEST)` name variant used by internal
    /// pre-release builds. Does not relax the thumbprint or key-hash
    /// pins.
    pub allow_test_variant: bool,
    /// Require the certificate to be valid at the time of the check.
    /// When `false`, a certificate that has since expired is still a
    /// candidate (old, legitimately-signed payloads).
    pub check_validity_now: bool,
}

impl PublisherPolicy {
    /// Create a policy expecting `company_name`, with no digest pins,
    /// the test variant disallowed, and validity checked now.
    #[must_use]
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            thumbprint: None,
            public_key_hash: None,
            allow_test_variant: false,
            check_validity_now: true,
        }
    }

    /// The accepted test-signing variant of the expected name.
    #[must_use]
    pub fn test_variant_name(&self) -> String {
        format!("{}{TEST_VARIANT_SUFFIX}", self.company_name)
    }

    /// `true` when `candidate` is an acceptable publisher name under
    /// this policy.
    #[must_use]
    pub fn accepts_name(&self, candidate: &str) -> bool {
        candidate == self.company_name
            || (self.allow_test_variant && candidate == self.test_variant_name())
    }
}
