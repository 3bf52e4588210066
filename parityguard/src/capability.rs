//! Host tool version gating for the parity check.
//!
//! The connectivity data a parity check needs is only trustworthy on some
//! KiCad generations: KiCad 5 has no usable API for it and 7.0.0 shipped a
//! broken connectivity API (fixed in 7.0.1).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// First KiCad generation able to run a parity check.
pub const MIN_PARITY_MAJOR: u32 = 6;
/// First KiCad 7 release with a working connectivity API.
pub const KICAD_VERSION_7_0_1: HostVersion = HostVersion::new(7, 0, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl HostVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid KiCad version `{0}`, expected MAJOR[.MINOR[.PATCH]]")]
pub struct VersionParseError(pub String);

impl FromStr for HostVersion {
    type Err = VersionParseError;

    /// Accepts `7`, `7.0`, `7.0.1` and suffixed forms such as `8.0.4-rc1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let trimmed = s.trim();
        let numeric = trimmed
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or("");
        if numeric.is_empty() {
            return Err(err());
        }
        let mut parts = numeric.split('.');
        let mut next = |required: bool| -> Result<u32, VersionParseError> {
            match parts.next() {
                Some(p) if !p.is_empty() => p.parse().map_err(|_| err()),
                Some(_) => Err(err()),
                None if required => Err(err()),
                None => Ok(0),
            }
        };
        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(HostVersion::new(major, minor, patch))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("PCB vs schematic parity only available for KiCad 6 and newer (found {0})")]
    LegacyHost(HostVersion),
    #[error("Connectivity API is broken on KiCad {0}\nPlease upgrade KiCad to 7.0.1 or newer")]
    BrokenConnectivityApi(HostVersion),
}

/// Decide whether a parity check can run on `version`.
///
/// An unknown version is accepted.
pub fn check_parity_support(version: Option<HostVersion>) -> Result<(), PreconditionError> {
    let Some(version) = version else {
        tracing::debug!("Host KiCad version unknown, assuming parity check support");
        return Ok(());
    };
    if version.major < MIN_PARITY_MAJOR {
        return Err(PreconditionError::LegacyHost(version));
    }
    if version.major == 7 && version < KICAD_VERSION_7_0_1 {
        return Err(PreconditionError::BrokenConnectivityApi(version));
    }
    Ok(())
}
