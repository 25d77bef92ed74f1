use std::path::Path;

use chrono::{TimeZone, Utc};
use sigvet_core::cert::ChainRole;
use sigvet_verify::decode::{DecodedSignature, InMemoryDecoder, RawCertificate};
use sigvet_verify::error::DecodeError;
use sigvet_verify::extract::extract_all;

fn cert(subject: &str, issuer: &str, der: &[u8]) -> RawCertificate {
    RawCertificate {
        subject: subject.to_owned(),
        issuer: issuer.to_owned(),
        not_before: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        not_after: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        der: der.to_vec(),
        public_key: der.to_vec(),
    }
}

fn publisher_chain() -> Vec<RawCertificate> {
    vec![
        cert("CN=Acme Software Inc, O=Acme", "CN=Intermediate CA", b"leaf"),
        cert("CN=Intermediate CA", "CN=Root CA", b"intermediate"),
        cert("CN=Root CA", "CN=Root CA", b"root"),
    ]
}

fn timestamp_authority_chain() -> Vec<RawCertificate> {
    vec![
        cert("CN=Timestamp Signer", "CN=Timestamp CA", b"tsa-leaf"),
        cert("CN=Timestamp CA", "CN=Timestamp CA", b"tsa-root"),
    ]
}

#[test]
fn unsigned_file_fails_with_no_signature() {
    let decoder = InMemoryDecoder::new();
    let result = extract_all(&decoder, Path::new("unsigned.exe"));
    assert!(matches!(result, Err(DecodeError::NoSignature)));
}

#[test]
fn malformed_container_is_surfaced_not_treated_as_absent() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert_malformed("broken.exe", "truncated container");
    let result = extract_all(&decoder, Path::new("broken.exe"));
    assert!(matches!(result, Err(DecodeError::Malformed(_))));
}

#[test]
fn single_signature_without_timestamp() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert(
        "signed.exe",
        vec![DecodedSignature {
            chain: publisher_chain(),
            timestamp_chain: Vec::new(),
        }],
    );

    let set = extract_all(&decoder, Path::new("signed.exe")).unwrap();
    // Leaf and intermediate; the self-signed root is excluded.
    assert_eq!(set.len(), 2);
    assert!(set.iter().all(|r| r.origin.role == ChainRole::Primary));
    assert!(set.iter().all(|r| !r.is_root));
    assert_eq!(
        set.records()[0].issuing_company_name.as_deref(),
        Some("Acme Software Inc")
    );
}

#[test]
fn timestamp_chain_is_tagged_separately() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert(
        "signed.exe",
        vec![DecodedSignature {
            chain: publisher_chain(),
            timestamp_chain: timestamp_authority_chain(),
        }],
    );

    let set = extract_all(&decoder, Path::new("signed.exe")).unwrap();
    assert_eq!(set.len(), 3);

    let roles: Vec<ChainRole> = set.iter().map(|r| r.origin.role).collect();
    assert_eq!(
        roles,
        vec![ChainRole::Primary, ChainRole::Primary, ChainRole::Timestamp]
    );
    assert_eq!(
        set.records()[2].issuing_company_name.as_deref(),
        Some("Timestamp Signer")
    );
}

#[test]
fn dual_signed_file_yields_union_in_discovery_order() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert(
        "dual.exe",
        vec![
            DecodedSignature {
                chain: publisher_chain(),
                timestamp_chain: timestamp_authority_chain(),
            },
            DecodedSignature {
                chain: vec![cert(
                    "CN=Acme Software Inc, O=Acme",
                    "CN=Modern Intermediate CA",
                    b"sha2-leaf",
                )],
                timestamp_chain: Vec::new(),
            },
        ],
    );

    let set = extract_all(&decoder, Path::new("dual.exe")).unwrap();
    // 2 + 1 primary certificates plus 1 timestamp certificate.
    assert_eq!(set.len(), 4);

    let indices: Vec<usize> = set.iter().map(|r| r.origin.signature_index).collect();
    assert_eq!(indices, vec![0, 0, 0, 1]);
    assert_eq!(set.records()[3].origin.role, ChainRole::Primary);
}

#[test]
fn chain_of_only_roots_yields_empty_set() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert(
        "selfsigned.exe",
        vec![DecodedSignature {
            chain: vec![cert("CN=Self Signed", "CN=Self Signed", b"self")],
            timestamp_chain: Vec::new(),
        }],
    );

    let set = extract_all(&decoder, Path::new("selfsigned.exe")).unwrap();
    assert!(set.is_empty());
}

#[test]
fn repeated_extraction_is_identical() {
    let mut decoder = InMemoryDecoder::new();
    decoder.insert(
        "signed.exe",
        vec![DecodedSignature {
            chain: publisher_chain(),
            timestamp_chain: timestamp_authority_chain(),
        }],
    );

    let first = extract_all(&decoder, Path::new("signed.exe")).unwrap();
    let second = extract_all(&decoder, Path::new("signed.exe")).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.thumbprint, b.thumbprint);
        assert_eq!(a.origin, b.origin);
    }
}
