//! Real platform collaborator bindings (crypt32 / WinTrust).
//!
//! Everything here is Windows-only; the portable seams live in
//! [`crate::decode`] and [`crate::trust`].
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

pub mod crypt;
pub(crate) mod handles;
pub mod wintrust;
