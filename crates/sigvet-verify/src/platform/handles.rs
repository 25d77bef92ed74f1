//! Scoped-release guards for crypt32 handles.
//!
//! Every store, message, and certificate-context handle acquired while
//! walking a signature must be released exactly once on every exit
//! path, including error paths. Holding them in these guards makes
//! early returns safe.

use core::ffi::c_void;

use windows_sys::Win32::Security::Cryptography::{
    CertCloseStore, CertFreeCertificateContext, CryptMsgClose, CERT_CONTEXT, HCERTSTORE,
};

pub(crate) struct CertStore(pub HCERTSTORE);

impl Drop for CertStore {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CertCloseStore(self.0, 0) };
        }
    }
}

pub(crate) struct CryptMsg(pub *mut c_void);

impl Drop for CryptMsg {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CryptMsgClose(self.0) };
        }
    }
}

pub(crate) struct CertContext(pub *const CERT_CONTEXT);

impl CertContext {
    pub fn get(&self) -> &CERT_CONTEXT {
        unsafe { &*self.0 }
    }
}

impl Drop for CertContext {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CertFreeCertificateContext(self.0) };
        }
    }
}
