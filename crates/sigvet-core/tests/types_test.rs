use sigvet_core::types::{PublicKeyHash, Thumbprint, ValidationError};

// Well-known digests of the empty input.
const SHA1_EMPTY: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";
const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[test]
fn thumbprint_of_der_is_sha1() {
    assert_eq!(Thumbprint::of_der(b"").as_hex(), SHA1_EMPTY);
}

#[test]
fn public_key_hash_is_sha256() {
    assert_eq!(PublicKeyHash::of_key(b"").as_hex(), SHA256_EMPTY);
}

#[test]
fn from_hex_normalizes_to_lowercase() {
    let upper = SHA1_EMPTY.to_ascii_uppercase();
    let t = Thumbprint::from_hex(&upper).unwrap();
    assert_eq!(t.as_hex(), SHA1_EMPTY);
    assert_eq!(t, Thumbprint::of_der(b""));
}

#[test]
fn from_hex_accepts_both_digest_lengths() {
    assert!(Thumbprint::from_hex(SHA1_EMPTY).is_ok());
    assert!(Thumbprint::from_hex(SHA256_EMPTY).is_ok());
    assert!(PublicKeyHash::from_hex(SHA1_EMPTY).is_ok());
}

#[test]
fn from_hex_rejects_bad_input() {
    assert_eq!(Thumbprint::from_hex(""), Err(ValidationError::Empty));
    assert_eq!(
        Thumbprint::from_hex("abc123"),
        Err(ValidationError::InvalidHexLength(6))
    );
    assert_eq!(
        Thumbprint::from_hex(&"g".repeat(40)),
        Err(ValidationError::InvalidHex)
    );
}
