//! Trust-verdict vocabulary and the platform trust-primitive seam.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Native status: chain valid, trusted root.
pub const TRUST_OK: u32 = 0;
/// Native status: no signature is present on the file.
pub const TRUST_E_NOSIGNATURE: u32 = 0x800B_0100;
/// Native status: a certificate in the chain has expired.
pub const CERT_E_EXPIRED: u32 = 0x800B_0101;
/// Native status: the chain terminates in an untrusted or unknown root.
pub const CERT_E_UNTRUSTEDROOT: u32 = 0x800B_0109;

/// Which root-of-trust set a verified chain may terminate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootPolicy {
    /// Production publisher roots only.
    Production,
    /// Production roots plus the internal test-signing root used for
    /// pre-release builds. Never widens what production accepts.
    TestSigning,
}

/// How a file's signature should be trust-verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// Acceptable root set.
    pub roots: RootPolicy,
    /// When `true`, certificate time windows are checked against the
    /// current time. When `false`, a chain that was valid at signing
    /// time is accepted even if since expired — old, legitimately
    /// signed payloads whose certificates have lapsed stay verifiable.
    pub check_validity_now: bool,
}

impl TrustPolicy {
    /// Production roots, validity checked against the current time.
    #[must_use]
    pub fn production() -> Self {
        Self {
            roots: RootPolicy::Production,
            check_validity_now: true,
        }
    }

    /// Test-signing root accepted, validity checked against the
    /// current time.
    #[must_use]
    pub fn test_signing() -> Self {
        Self {
            roots: RootPolicy::TestSigning,
            check_validity_now: true,
        }
    }

    /// The same policy evaluated as of signing time instead of now.
    #[must_use]
    pub fn at_signing_time(mut self) -> Self {
        self.check_validity_now = false;
        self
    }
}

/// Normalized trust outcome. Callers branch on this, never on the
/// native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustStatus {
    /// The chain is valid and terminates in an acceptable root.
    Trusted,
    /// The chain is valid but terminates in an unknown root.
    UntrustedRoot,
    /// The file carries no signature.
    NoSignature,
    /// A certificate in the chain has expired.
    Expired,
    /// Any other native failure.
    Other(u32),
}

/// The outcome of platform trust verification for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustVerdict {
    /// Normalized status.
    pub status: TrustStatus,
    /// Native platform status code, preserved verbatim for logs.
    pub native: u32,
}

impl TrustVerdict {
    /// Normalize a native platform status code.
    #[must_use]
    pub fn from_native(native: u32) -> Self {
        let status = match native {
            TRUST_OK => TrustStatus::Trusted,
            CERT_E_UNTRUSTEDROOT => TrustStatus::UntrustedRoot,
            TRUST_E_NOSIGNATURE => TrustStatus::NoSignature,
            CERT_E_EXPIRED => TrustStatus::Expired,
            other => TrustStatus::Other(other),
        };
        Self { status, native }
    }

    /// `true` when the status is [`TrustStatus::Trusted`].
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        self.status == TrustStatus::Trusted
    }
}

/// Platform primitive that builds and validates a file's signature
/// chain against a root set.
///
/// Implementations own all chain-building cryptography, revocation
/// policy, and any network access; callers only see the native status
/// code, normalized through [`TrustVerdict::from_native`].
pub trait TrustProvider: Send + Sync {
    /// Verify `path` under `policy` and return the native status code.
    fn verify_file(&self, path: &Path, policy: &TrustPolicy) -> u32;
}

#[derive(Debug, Clone, Copy)]
struct FileTrust {
    test_rooted: bool,
    expired_now: bool,
    code: u32,
}

/// An in-memory [`TrustProvider`] for deterministic tests.
///
/// Files are provisioned with the facts the platform would discover;
/// unknown paths read as unsigned.
#[derive(Debug, Default)]
pub struct InMemoryTrustProvider {
    files: HashMap<PathBuf, FileTrust>,
}

impl InMemoryTrustProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a validly signed file chaining to a production root.
    pub fn add_trusted(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(
            path.into(),
            FileTrust {
                test_rooted: false,
                expired_now: false,
                code: TRUST_OK,
            },
        );
    }

    /// Provision a file signed under the internal test-signing root.
    pub fn add_test_signed(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(
            path.into(),
            FileTrust {
                test_rooted: true,
                expired_now: false,
                code: TRUST_OK,
            },
        );
    }

    /// Provision a file whose certificate was valid at signing time
    /// but has since expired.
    pub fn add_expired(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(
            path.into(),
            FileTrust {
                test_rooted: false,
                expired_now: true,
                code: TRUST_OK,
            },
        );
    }

    /// Provision a file chaining to an unknown root.
    pub fn add_untrusted_root(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(
            path.into(),
            FileTrust {
                test_rooted: false,
                expired_now: false,
                code: CERT_E_UNTRUSTEDROOT,
            },
        );
    }

    /// Provision a file with an arbitrary native status code.
    pub fn add_with_code(&mut self, path: impl Into<PathBuf>, code: u32) {
        self.files.insert(
            path.into(),
            FileTrust {
                test_rooted: false,
                expired_now: false,
                code,
            },
        );
    }
}

impl TrustProvider for InMemoryTrustProvider {
    fn verify_file(&self, path: &Path, policy: &TrustPolicy) -> u32 {
        let Some(file) = self.files.get(path) else {
            return TRUST_E_NOSIGNATURE;
        };
        if file.test_rooted && policy.roots == RootPolicy::Production {
            return CERT_E_UNTRUSTEDROOT;
        }
        if file.expired_now && policy.check_validity_now {
            return CERT_E_EXPIRED;
        }
        file.code
    }
}
