//! `sigvet inspect` — dump a file's certificate set as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

/// Extract and print every certificate found in `path`.
///
/// An unsigned file prints an empty list; a malformed container is an
/// error.
///
/// # Errors
///
/// Returns an error when the platform collaborators are unavailable or
/// the container cannot be read or parsed.
pub fn run_inspect(path: &Path) -> Result<()> {
    let verifier = crate::platform_verifier()?;
    let set = verifier
        .extract_all(path)
        .with_context(|| format!("extracting certificates from {}", path.display()))?;
    debug!("{} certificate(s) extracted", set.len());
    println!("{}", serde_json::to_string_pretty(set.records())?);
    Ok(())
}
