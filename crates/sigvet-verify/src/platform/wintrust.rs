//! [`TrustProvider`] backed by `WinVerifyTrust`.

use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::{mem, ptr, slice};

use log::debug;
use sigvet_core::types::Thumbprint;
use windows_sys::core::GUID;
use windows_sys::Win32::Foundation::INVALID_HANDLE_VALUE;
use windows_sys::Win32::Security::WinTrust::{
    WTHelperGetProvSignerFromChain, WTHelperProvDataFromStateData, WinVerifyTrust,
    WINTRUST_DATA, WINTRUST_FILE_INFO, WTD_CACHE_ONLY_URL_RETRIEVAL, WTD_CHOICE_FILE,
    WTD_LIFETIME_SIGNING_FLAG, WTD_REVOKE_WHOLECHAIN, WTD_STATEACTION_CLOSE,
    WTD_STATEACTION_VERIFY, WTD_UI_NONE,
};

use crate::trust::{RootPolicy, TrustPolicy, TrustProvider, CERT_E_UNTRUSTEDROOT, TRUST_OK};

// WINTRUST_ACTION_GENERIC_VERIFY_V2; the header macro is not in the
// bindings.
const GENERIC_VERIFY_V2: GUID = GUID::from_u128(0x00aac56b_cd44_11d0_8cc2_00c04fc295ee);

/// Verifies Authenticode signatures through the platform trust engine.
///
/// Chain building, revocation, and time validity all happen inside
/// `WinVerifyTrust`; this type only shapes the request and hands the
/// native status code back for normalization.
pub struct WinTrustProvider {
    allow_network_checks: bool,
    test_root_thumbprint: Option<Thumbprint>,
}

impl WinTrustProvider {
    /// Create a provider. `allow_network_checks` permits online
    /// revocation retrieval; when `false` only cached revocation data
    /// is consulted and verification never blocks on the network.
    #[must_use]
    pub fn new(allow_network_checks: bool) -> Self {
        Self {
            allow_network_checks,
            test_root_thumbprint: None,
        }
    }

    /// Accept, under [`RootPolicy::TestSigning`], chains terminating in
    /// the root certificate with this thumbprint.
    #[must_use]
    pub fn with_test_root(mut self, thumbprint: Thumbprint) -> Self {
        self.test_root_thumbprint = Some(thumbprint);
        self
    }

    /// Inspect the chain built during the verify state action and
    /// check whether its root is the configured test-signing root.
    fn chain_ends_in_test_root(&self, data: &WINTRUST_DATA) -> bool {
        let Some(expected) = &self.test_root_thumbprint else {
            return false;
        };
        let prov_data = unsafe { WTHelperProvDataFromStateData(data.hWVTStateData) };
        if prov_data.is_null() {
            return false;
        }
        let signer = unsafe { WTHelperGetProvSignerFromChain(prov_data, 0, 0, 0) };
        if signer.is_null() {
            return false;
        }
        let signer = unsafe { &*signer };
        if signer.csCertChain == 0 {
            return false;
        }
        let root = unsafe { &*signer.pasCertChain.add(signer.csCertChain as usize - 1) };
        let cert = unsafe { &*root.pCert };
        let der = unsafe { slice::from_raw_parts(cert.pbCertEncoded, cert.cbCertEncoded as usize) };
        let actual = Thumbprint::of_der(der);
        debug!("untrusted root thumbprint {actual}, test root {expected}");
        actual == *expected
    }
}

impl TrustProvider for WinTrustProvider {
    fn verify_file(&self, path: &Path, policy: &TrustPolicy) -> u32 {
        let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();

        let mut file_info: WINTRUST_FILE_INFO = unsafe { mem::zeroed() };
        file_info.cbStruct = mem::size_of::<WINTRUST_FILE_INFO>() as u32;
        file_info.pcwszFilePath = wide.as_ptr();

        let mut data: WINTRUST_DATA = unsafe { mem::zeroed() };
        data.cbStruct = mem::size_of::<WINTRUST_DATA>() as u32;
        data.dwUIChoice = WTD_UI_NONE;
        data.fdwRevocationChecks = WTD_REVOKE_WHOLECHAIN;
        data.dwUnionChoice = WTD_CHOICE_FILE;
        data.Anonymous.pFile = &mut file_info;
        data.dwStateAction = WTD_STATEACTION_VERIFY;
        if !self.allow_network_checks {
            data.dwProvFlags |= WTD_CACHE_ONLY_URL_RETRIEVAL;
        }
        if policy.check_validity_now {
            // Without this flag the engine accepts a timestamped
            // signature whose certificate has since lapsed.
            data.dwProvFlags |= WTD_LIFETIME_SIGNING_FLAG;
        }

        let native = unsafe {
            WinVerifyTrust(
                INVALID_HANDLE_VALUE,
                &GENERIC_VERIFY_V2,
                ptr::from_mut(&mut data).cast(),
            )
        } as u32;

        let native = if native == CERT_E_UNTRUSTEDROOT
            && policy.roots == RootPolicy::TestSigning
            && self.chain_ends_in_test_root(&data)
        {
            TRUST_OK
        } else {
            native
        };

        // Release the verification state opened by the verify action.
        data.dwStateAction = WTD_STATEACTION_CLOSE;
        unsafe {
            WinVerifyTrust(
                INVALID_HANDLE_VALUE,
                &GENERIC_VERIFY_V2,
                ptr::from_mut(&mut data).cast(),
            );
        }

        native
    }
}
