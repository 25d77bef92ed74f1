use chrono::{TimeZone, Utc};
use sigvet_core::cert::{CertificateRecord, CertificateSet, ChainRole, SignatureOrigin};
use sigvet_core::types::{PublicKeyHash, Thumbprint};

fn sample_record(role: ChainRole) -> CertificateRecord {
    CertificateRecord {
        issuing_company_name: Some("Acme Software Inc".to_owned()),
        subject: "CN=Acme Software Inc, O=Acme, C=US".to_owned(),
        thumbprint: Thumbprint::of_der(b"leaf certificate"),
        public_key_hash: PublicKeyHash::of_key(b"leaf key"),
        not_before: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        not_after: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        is_root: false,
        origin: SignatureOrigin {
            signature_index: 0,
            role,
        },
    }
}

#[test]
fn chain_role_serializes_snake_case() {
    let json = serde_json::to_string(&ChainRole::Timestamp).unwrap();
    assert_eq!(json, r#""timestamp""#);
}

#[test]
fn certificate_set_roundtrips_json() {
    let mut set = CertificateSet::new();
    set.push(sample_record(ChainRole::Primary));
    set.push(sample_record(ChainRole::Timestamp));

    let json = serde_json::to_string(&set).unwrap();
    let back: CertificateSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.records()[1].origin.role, ChainRole::Timestamp);
}

#[test]
fn validity_window_is_inclusive() {
    let record = sample_record(ChainRole::Primary);
    assert!(record.is_valid_at(record.not_before));
    assert!(record.is_valid_at(record.not_after));
    assert!(!record.is_valid_at(Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 59).unwrap()));
    assert!(!record.is_valid_at(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap()));
}

#[test]
fn set_preserves_discovery_order() {
    let mut set = CertificateSet::new();
    for i in 0..3 {
        let mut r = sample_record(ChainRole::Primary);
        r.origin.signature_index = i;
        set.push(r);
    }
    let indices: Vec<usize> = set.iter().map(|r| r.origin.signature_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
