//! [`SignatureDecoder`] backed by the crypt32 message APIs.
//!
//! Walks the embedded PKCS#7 container(s) of a file: one chain per
//! signer, the counter-signature (timestamp) chain per signer, and any
//! nested signatures carried for dual signing.

use core::ffi::c_void;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::{mem, ptr, slice};

use chrono::{DateTime, Utc};
use log::debug;
use windows_sys::core::PSTR;
use windows_sys::Win32::Foundation::{GetLastError, FILETIME};
use windows_sys::Win32::Security::Cryptography::{
    CertFindCertificateInStore, CertNameToStrW, CertOpenStore, CryptDecodeObject,
    CryptMsgGetParam, CryptMsgOpenToDecode, CryptMsgUpdate, CryptQueryObject, CERT_CONTEXT,
    CERT_FIND_SUBJECT_CERT, CERT_FIND_SUBJECT_NAME, CERT_INFO, CERT_QUERY_CONTENT_FLAG_PKCS7_SIGNED_EMBED,
    CERT_QUERY_FORMAT_FLAG_BINARY, CERT_QUERY_OBJECT_FILE, CERT_STORE_PROV_MSG,
    CERT_X500_NAME_STR, CMSG_SIGNER_COUNT_PARAM, CMSG_SIGNER_INFO, CMSG_SIGNER_INFO_PARAM,
    CRYPT_INTEGER_BLOB, HCERTSTORE, PKCS7_SIGNER_INFO, PKCS_7_ASN_ENCODING, X509_ASN_ENCODING,
};

use super::handles::{CertContext, CertStore, CryptMsg};
use crate::decode::{DecodedSignature, RawCertificate, SignatureDecoder};
use crate::error::DecodeError;

const ENCODING: u32 = X509_ASN_ENCODING | PKCS_7_ASN_ENCODING;

const OID_COUNTER_SIGN: &[u8] = b"1.2.840.113549.1.9.6";
const OID_RFC3161_COUNTER_SIGN: &[u8] = b"1.3.6.1.4.1.311.3.3.1";
const OID_NESTED_SIGNATURE: &[u8] = b"1.3.6.1.4.1.311.2.4.1";

// Nested containers are attacker-controlled input; bound the recursion.
const MAX_NESTING: u32 = 4;
// Chains are short in practice; bounds a malformed subject/issuer cycle.
const MAX_CHAIN_LEN: usize = 16;

/// Decodes embedded signature containers through crypt32.
///
/// Purely structural: certificates come out exactly as the container
/// lists them, roots included; no trust evaluation happens here.
#[derive(Debug, Default)]
pub struct CryptDecoder;

impl CryptDecoder {
    /// Create a decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SignatureDecoder for CryptDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<DecodedSignature>, DecodeError> {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();

        let mut store_handle: HCERTSTORE = ptr::null_mut();
        let mut msg_handle: *mut c_void = ptr::null_mut();
        let ok = unsafe {
            CryptQueryObject(
                CERT_QUERY_OBJECT_FILE,
                wide.as_ptr().cast(),
                CERT_QUERY_CONTENT_FLAG_PKCS7_SIGNED_EMBED,
                CERT_QUERY_FORMAT_FLAG_BINARY,
                0,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut store_handle,
                &mut msg_handle,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(query_error(unsafe { GetLastError() }));
        }
        let store = CertStore(store_handle);
        let msg = CryptMsg(msg_handle);

        let mut signatures = Vec::new();
        collect_signatures(&msg, &store, &mut signatures, 0)?;
        if signatures.is_empty() {
            return Err(DecodeError::NoSignature);
        }
        debug!(
            "{}: {} independent signature(s)",
            path.display(),
            signatures.len()
        );
        Ok(signatures)
    }
}

fn query_error(code: u32) -> DecodeError {
    const CRYPT_E_NO_MATCH: u32 = 0x8009_2009;
    const ERROR_FILE_NOT_FOUND: u32 = 2;
    const ERROR_PATH_NOT_FOUND: u32 = 3;
    match code {
        CRYPT_E_NO_MATCH => DecodeError::NoSignature,
        ERROR_FILE_NOT_FOUND | ERROR_PATH_NOT_FOUND => {
            DecodeError::Io(std::io::Error::from_raw_os_error(code as i32))
        }
        other => DecodeError::Malformed(format!("CryptQueryObject failed with {other:#010x}")),
    }
}

/// Append one `DecodedSignature` per signer of `msg`, plus any nested
/// signatures found in unauthenticated attributes.
fn collect_signatures(
    msg: &CryptMsg,
    store: &CertStore,
    out: &mut Vec<DecodedSignature>,
    depth: u32,
) -> Result<(), DecodeError> {
    if depth > MAX_NESTING {
        return Err(DecodeError::Malformed(
            "nested signatures exceed supported depth".to_owned(),
        ));
    }

    let count_buf = msg_param(msg.0, CMSG_SIGNER_COUNT_PARAM, 0)?;
    let Some(&count_word) = count_buf.first() else {
        return Err(DecodeError::Malformed(
            "signer count parameter truncated".to_owned(),
        ));
    };
    let count = count_word as u32;

    for index in 0..count {
        let signer_buf = msg_param(msg.0, CMSG_SIGNER_INFO_PARAM, index)?;
        let signer = unsafe { &*signer_buf.as_ptr().cast::<CMSG_SIGNER_INFO>() };

        let chain = chain_for_signer(store, &signer.Issuer, &signer.SerialNumber)?;
        let timestamp_chain = timestamp_chain(store, signer)?;
        out.push(DecodedSignature {
            chain,
            timestamp_chain,
        });

        nested_signatures(signer, out, depth)?;
    }
    Ok(())
}

/// Walk from a signer's leaf toward the root inside the message store.
fn chain_for_signer(
    store: &CertStore,
    issuer: &CRYPT_INTEGER_BLOB,
    serial: &CRYPT_INTEGER_BLOB,
) -> Result<Vec<RawCertificate>, DecodeError> {
    let mut find: CERT_INFO = unsafe { mem::zeroed() };
    find.Issuer = *issuer;
    find.SerialNumber = *serial;

    let leaf = unsafe {
        CertFindCertificateInStore(
            store.0,
            ENCODING,
            0,
            CERT_FIND_SUBJECT_CERT,
            ptr::from_ref(&find).cast(),
            ptr::null(),
        )
    };
    if leaf.is_null() {
        return Err(DecodeError::Malformed(
            "signer certificate not present in container".to_owned(),
        ));
    }

    let mut chain = Vec::new();
    let mut current = CertContext(leaf);
    loop {
        let cert = current.get();
        chain.push(convert(cert));
        if chain.len() >= MAX_CHAIN_LEN {
            break;
        }

        let info = unsafe { &*cert.pCertInfo };
        if blob_eq(&info.Subject, &info.Issuer) {
            break; // self-signed root reached
        }
        let next = unsafe {
            CertFindCertificateInStore(
                store.0,
                ENCODING,
                0,
                CERT_FIND_SUBJECT_NAME,
                ptr::from_ref(&info.Issuer).cast(),
                ptr::null(),
            )
        };
        if next.is_null() {
            break; // issuer not carried in the container
        }
        current = CertContext(next);
    }
    Ok(chain)
}

/// Chain of the signer's timestamp counter-signature, or empty when the
/// signer carries none.
fn timestamp_chain(
    store: &CertStore,
    signer: &CMSG_SIGNER_INFO,
) -> Result<Vec<RawCertificate>, DecodeError> {
    for index in 0..signer.UnauthAttrs.cAttr {
        let attr = unsafe { &*signer.UnauthAttrs.rgAttr.add(index as usize) };
        if attr.cValue == 0 {
            continue;
        }
        let value = unsafe { &*attr.rgValue };
        let blob = unsafe { slice::from_raw_parts(value.pbData, value.cbData as usize) };

        if oid_eq(attr.pszObjId, OID_COUNTER_SIGN) {
            let ts_buf = decode_signer_info(blob)?;
            let ts_signer = unsafe { &*ts_buf.as_ptr().cast::<CMSG_SIGNER_INFO>() };
            return chain_for_signer(store, &ts_signer.Issuer, &ts_signer.SerialNumber);
        }
        if oid_eq(attr.pszObjId, OID_RFC3161_COUNTER_SIGN) {
            // The RFC3161 token is a complete SignedData carrying its
            // own certificates.
            let (ts_msg, ts_store) = open_signed_blob(blob)?;
            let ts_buf = msg_param(ts_msg.0, CMSG_SIGNER_INFO_PARAM, 0)?;
            let ts_signer = unsafe { &*ts_buf.as_ptr().cast::<CMSG_SIGNER_INFO>() };
            return chain_for_signer(&ts_store, &ts_signer.Issuer, &ts_signer.SerialNumber);
        }
    }
    Ok(Vec::new())
}

/// Decode any nested-signature attributes (dual signing) as further
/// independent signatures.
fn nested_signatures(
    signer: &CMSG_SIGNER_INFO,
    out: &mut Vec<DecodedSignature>,
    depth: u32,
) -> Result<(), DecodeError> {
    for index in 0..signer.UnauthAttrs.cAttr {
        let attr = unsafe { &*signer.UnauthAttrs.rgAttr.add(index as usize) };
        if !oid_eq(attr.pszObjId, OID_NESTED_SIGNATURE) {
            continue;
        }
        for value_index in 0..attr.cValue {
            let value = unsafe { &*attr.rgValue.add(value_index as usize) };
            let blob = unsafe { slice::from_raw_parts(value.pbData, value.cbData as usize) };
            let (nested_msg, nested_store) = open_signed_blob(blob)?;
            collect_signatures(&nested_msg, &nested_store, out, depth + 1)?;
        }
    }
    Ok(())
}

/// Open a DER `SignedData` blob as a message plus its certificate
/// store.
fn open_signed_blob(blob: &[u8]) -> Result<(CryptMsg, CertStore), DecodeError> {
    let msg_handle = unsafe { CryptMsgOpenToDecode(ENCODING, 0, 0, 0, ptr::null(), ptr::null()) };
    if msg_handle.is_null() {
        return Err(DecodeError::Malformed(
            "CryptMsgOpenToDecode failed".to_owned(),
        ));
    }
    let msg = CryptMsg(msg_handle);
    if unsafe { CryptMsgUpdate(msg.0, blob.as_ptr(), blob.len() as u32, 1) } == 0 {
        return Err(DecodeError::Malformed(
            "embedded signature blob does not parse".to_owned(),
        ));
    }
    let store_handle =
        unsafe { CertOpenStore(CERT_STORE_PROV_MSG, ENCODING, 0, 0, msg.0.cast_const().cast()) };
    if store_handle.is_null() {
        return Err(DecodeError::Malformed(
            "embedded signature carries no certificate store".to_owned(),
        ));
    }
    Ok((msg, CertStore(store_handle)))
}

/// Two-call `CryptDecodeObject` for a PKCS#7 `SignerInfo` blob, into
/// 8-byte aligned storage (the decoded struct carries pointers).
fn decode_signer_info(blob: &[u8]) -> Result<Vec<u64>, DecodeError> {
    let mut len = 0u32;
    let ok = unsafe {
        CryptDecodeObject(
            ENCODING,
            PKCS7_SIGNER_INFO,
            blob.as_ptr(),
            blob.len() as u32,
            0,
            ptr::null_mut(),
            &mut len,
        )
    };
    if ok == 0 {
        return Err(DecodeError::Malformed(
            "counter-signature signer info does not decode".to_owned(),
        ));
    }
    let mut buf = vec![0u64; (len as usize).div_ceil(8)];
    let ok = unsafe {
        CryptDecodeObject(
            ENCODING,
            PKCS7_SIGNER_INFO,
            blob.as_ptr(),
            blob.len() as u32,
            0,
            buf.as_mut_ptr().cast(),
            &mut len,
        )
    };
    if ok == 0 {
        return Err(DecodeError::Malformed(
            "counter-signature signer info does not decode".to_owned(),
        ));
    }
    Ok(buf)
}

/// Two-call `CryptMsgGetParam`, into 8-byte aligned storage (decoded
/// parameter structs carry pointers).
fn msg_param(msg: *mut c_void, param: u32, index: u32) -> Result<Vec<u64>, DecodeError> {
    let mut len = 0u32;
    if unsafe { CryptMsgGetParam(msg, param, index, ptr::null_mut(), &mut len) } == 0 {
        return Err(DecodeError::Malformed(format!(
            "CryptMsgGetParam({param}) size query failed"
        )));
    }
    let mut buf = vec![0u64; (len as usize).div_ceil(8)];
    if unsafe { CryptMsgGetParam(msg, param, index, buf.as_mut_ptr().cast(), &mut len) } == 0 {
        return Err(DecodeError::Malformed(format!(
            "CryptMsgGetParam({param}) read failed"
        )));
    }
    Ok(buf)
}

fn convert(cert: &CERT_CONTEXT) -> RawCertificate {
    let info = unsafe { &*cert.pCertInfo };
    let der = unsafe { slice::from_raw_parts(cert.pbCertEncoded, cert.cbCertEncoded as usize) };
    let key = &info.SubjectPublicKeyInfo.PublicKey;
    let public_key = unsafe { slice::from_raw_parts(key.pbData, key.cbData as usize) };
    RawCertificate {
        subject: name_to_string(&info.Subject),
        issuer: name_to_string(&info.Issuer),
        not_before: filetime_to_utc(&info.NotBefore),
        not_after: filetime_to_utc(&info.NotAfter),
        der: der.to_vec(),
        public_key: public_key.to_vec(),
    }
}

fn name_to_string(blob: &CRYPT_INTEGER_BLOB) -> String {
    let len = unsafe { CertNameToStrW(ENCODING, blob, CERT_X500_NAME_STR, ptr::null_mut(), 0) };
    let mut buf = vec![0u16; len as usize];
    let written = unsafe { CertNameToStrW(ENCODING, blob, CERT_X500_NAME_STR, buf.as_mut_ptr(), len) };
    String::from_utf16_lossy(&buf[..written.saturating_sub(1) as usize])
}

fn blob_eq(a: &CRYPT_INTEGER_BLOB, b: &CRYPT_INTEGER_BLOB) -> bool {
    let a = unsafe { slice::from_raw_parts(a.pbData, a.cbData as usize) };
    let b = unsafe { slice::from_raw_parts(b.pbData, b.cbData as usize) };
    a == b
}

fn filetime_to_utc(ft: &FILETIME) -> DateTime<Utc> {
    const HUNDRED_NS_PER_SEC: i64 = 10_000_000;
    const EPOCH_OFFSET_SECS: i64 = 11_644_473_600; // 1601-01-01 to 1970-01-01
    let raw = (i64::from(ft.dwHighDateTime) << 32) | i64::from(ft.dwLowDateTime);
    let secs = raw / HUNDRED_NS_PER_SEC - EPOCH_OFFSET_SECS;
    let nanos = (raw % HUNDRED_NS_PER_SEC) * 100;
    DateTime::from_timestamp(secs, nanos as u32).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn oid_eq(oid_ptr: PSTR, oid: &[u8]) -> bool {
    if oid_ptr.is_null() {
        return false;
    }
    let mut len = 0usize;
    while unsafe { *oid_ptr.add(len) } != 0 {
        len += 1;
    }
    unsafe { slice::from_raw_parts(oid_ptr, len) } == oid
}
