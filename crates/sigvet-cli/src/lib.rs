//! sigvet CLI library — command implementations.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

/// CLI subcommand implementations.
pub mod commands;

use anyhow::Result;
use sigvet_verify::verifier::FileVerifier;

/// Build a verifier over the real platform collaborators.
///
/// # Errors
///
/// Fails on hosts without the platform signature APIs.
pub fn platform_verifier() -> Result<FileVerifier> {
    #[cfg(windows)]
    {
        Ok(FileVerifier::platform())
    }
    #[cfg(not(windows))]
    {
        anyhow::bail!("signature inspection requires the Windows platform crypto APIs")
    }
}
