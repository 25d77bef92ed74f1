//! Walks decoded signatures into an ordered certificate set.

use std::path::Path;

use log::debug;
use sigvet_core::cert::{CertificateRecord, CertificateSet, ChainRole, SignatureOrigin};
use sigvet_core::dn::first_common_name;
use sigvet_core::types::{PublicKeyHash, Thumbprint};

use crate::decode::{RawCertificate, SignatureDecoder};
use crate::error::DecodeError;

/// Extract every non-root certificate from every signature in `path`.
///
/// For each independent signature, the primary chain is recorded first
/// and the timestamp counter-signature chain second, preserving the
/// leaf-first order within each chain. Self-signed certificates are
/// implicit trust anchors, not identity evidence, and are skipped.
/// Purely structural: no trust judgment happens here.
///
/// # Errors
///
/// Returns [`DecodeError::NoSignature`] for files without a signature
/// container, [`DecodeError::Malformed`] when a container cannot be
/// parsed, and [`DecodeError::Io`] when the file cannot be read.
/// Either the full set is produced or extraction fails; there is no
/// partial result.
pub fn extract_all(
    decoder: &dyn SignatureDecoder,
    path: &Path,
) -> Result<CertificateSet, DecodeError> {
    let signatures = decoder.decode(path)?;
    let mut set = CertificateSet::new();

    for (signature_index, signature) in signatures.iter().enumerate() {
        debug!(
            "signature {signature_index}: {} chain certificates, {} timestamp certificates",
            signature.chain.len(),
            signature.timestamp_chain.len()
        );
        collect_chain(
            &mut set,
            &signature.chain,
            SignatureOrigin {
                signature_index,
                role: ChainRole::Primary,
            },
        );
        collect_chain(
            &mut set,
            &signature.timestamp_chain,
            SignatureOrigin {
                signature_index,
                role: ChainRole::Timestamp,
            },
        );
    }

    Ok(set)
}

fn collect_chain(set: &mut CertificateSet, chain: &[RawCertificate], origin: SignatureOrigin) {
    for raw in chain {
        if raw.is_self_signed() {
            debug!("skipping root certificate '{}'", raw.subject);
            continue;
        }
        set.push(to_record(raw, origin));
    }
}

fn to_record(raw: &RawCertificate, origin: SignatureOrigin) -> CertificateRecord {
    CertificateRecord {
        issuing_company_name: first_common_name(&raw.subject),
        subject: raw.subject.clone(),
        thumbprint: Thumbprint::of_der(&raw.der),
        public_key_hash: PublicKeyHash::of_key(&raw.public_key),
        not_before: raw.not_before,
        not_after: raw.not_after,
        is_root: false,
        origin,
    }
}
