//! `sigvet verify` — check a file against a publisher policy.

use std::path::Path;

use anyhow::Result;
use log::info;
use sigvet_core::policy::PublisherPolicy;
use sigvet_core::types::{PublicKeyHash, Thumbprint};
use sigvet_verify::error::VerifyError;

/// Flags assembled into a [`PublisherPolicy`].
#[derive(Debug)]
pub struct VerifyArgs {
    /// Expected publisher name (first CN of the signing certificate).
    pub publisher: String,
    /// Required certificate thumbprint, hex.
    pub thumbprint: Option<String>,
    /// Required public-key hash, hex.
    pub key_hash: Option<String>,
    /// Also accept the ` (TEST)` publisher name variant.
    pub allow_test_variant: bool,
    /// Skip the validity-window check against the current time.
    pub no_validity_check: bool,
}

fn build_policy(args: &VerifyArgs) -> Result<PublisherPolicy> {
    let mut policy = PublisherPolicy::new(args.publisher.as_str());
    if let Some(hex) = &args.thumbprint {
        policy.thumbprint = Some(Thumbprint::from_hex(hex)?);
    }
    if let Some(hex) = &args.key_hash {
        policy.public_key_hash = Some(PublicKeyHash::from_hex(hex)?);
    }
    policy.allow_test_variant = args.allow_test_variant;
    policy.check_validity_now = !args.no_validity_check;
    Ok(policy)
}

/// Verify `path` against the policy described by `args`.
///
/// Returns `Ok(true)` on a publisher match and `Ok(false)` on a policy
/// mismatch, so the caller can reflect the verdict in the exit status.
///
/// # Errors
///
/// Returns an error for invalid digest flags, unavailable platform
/// collaborators, or a file whose container cannot be read or parsed.
pub fn run_verify(path: &Path, args: &VerifyArgs) -> Result<bool> {
    let policy = build_policy(args)?;
    let verifier = crate::platform_verifier()?;
    match verifier.verify_publisher(path, &policy) {
        Ok(record) => {
            info!("publisher match in {}", path.display());
            println!("match: {} (thumbprint {})", record.subject, record.thumbprint);
            Ok(true)
        }
        Err(VerifyError::PolicyMismatch { expected }) => {
            println!("no match: no certificate satisfied the policy for '{expected}'");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> VerifyArgs {
        VerifyArgs {
            publisher: "Acme Software Inc".to_owned(),
            thumbprint: None,
            key_hash: None,
            allow_test_variant: false,
            no_validity_check: false,
        }
    }

    #[test]
    fn policy_mirrors_flags() {
        let mut a = args();
        a.allow_test_variant = true;
        a.no_validity_check = true;
        let policy = build_policy(&a).unwrap();
        assert_eq!(policy.company_name, "Acme Software Inc");
        assert!(policy.allow_test_variant);
        assert!(!policy.check_validity_now);
        assert!(policy.thumbprint.is_none());
    }

    #[test]
    fn bad_thumbprint_hex_is_rejected() {
        let mut a = args();
        a.thumbprint = Some("not-hex".to_owned());
        assert!(build_policy(&a).is_err());
    }
}
