//! First-match scan of a certificate set against a publisher policy.

use chrono::{DateTime, Utc};
use log::debug;

use crate::cert::{CertificateRecord, CertificateSet, ChainRole};
use crate::policy::PublisherPolicy;

/// Find the first certificate in discovery order satisfying `policy`.
///
/// Only primary-chain certificates are candidates; timestamp
/// authorities are never acceptable publisher identities. The first
/// record satisfying every supplied constraint wins — there is no
/// scoring and no "best" match, which keeps the decision deterministic
/// and auditable. Returns `None` when no record matches.
#[must_use]
pub fn find_first_match<'a>(
    set: &'a CertificateSet,
    policy: &PublisherPolicy,
) -> Option<&'a CertificateRecord> {
    find_first_match_at(set, policy, Utc::now())
}

/// Like [`find_first_match`] with an explicit `now`, so validity-window
/// behavior is deterministic under test.
#[must_use]
pub fn find_first_match_at<'a>(
    set: &'a CertificateSet,
    policy: &PublisherPolicy,
    now: DateTime<Utc>,
) -> Option<&'a CertificateRecord> {
    let matched = set.iter().find(|record| is_match(record, policy, now));
    if let Some(record) = matched {
        debug!(
            "publisher match: '{}' thumbprint {} (signature {})",
            record.subject, record.thumbprint, record.origin.signature_index
        );
    }
    matched
}

fn is_match(record: &CertificateRecord, policy: &PublisherPolicy, now: DateTime<Utc>) -> bool {
    if record.origin.role != ChainRole::Primary {
        return false;
    }
    if policy.check_validity_now && !record.is_valid_at(now) {
        return false;
    }
    let Some(name) = record.issuing_company_name.as_deref() else {
        return false;
    };
    if !policy.accepts_name(name) {
        return false;
    }
    if let Some(expected) = &policy.thumbprint {
        if *expected != record.thumbprint {
            return false;
        }
    }
    if let Some(expected) = &policy.public_key_hash {
        if *expected != record.public_key_hash {
            return false;
        }
    }
    true
}
