//! `sigvet trust` — raw platform trust verdict for a file.

use std::path::Path;

use anyhow::Result;
use sigvet_verify::trust::{TrustPolicy, TrustVerdict};

/// Ask the platform trust engine for a verdict on `path` and print it.
///
/// # Errors
///
/// Returns an error when the platform collaborators are unavailable.
pub fn run_trust(path: &Path, test_signing: bool, at_signing_time: bool) -> Result<TrustVerdict> {
    let mut policy = if test_signing {
        TrustPolicy::test_signing()
    } else {
        TrustPolicy::production()
    };
    if at_signing_time {
        policy = policy.at_signing_time();
    }

    let verifier = crate::platform_verifier()?;
    let verdict = verifier.verify_trust(path, &policy);
    println!("{:?} (native {:#010x})", verdict.status, verdict.native);
    Ok(verdict)
}
