//! API version matching.
//!
//! # Responsibilities
//! - Match the leading `v<digits>/` segment of a prefix-stripped path
//! - Parse the version number (1-indexed; zero is invalid)
//! - Report how many bytes were consumed so the caller can slice the remainder
//!
//! # Design Decisions
//! - Patterns compiled once at startup into an immutable `PatternTable`
//! - The table is shared by reference; nothing mutates it at runtime
//! - Pure functions: no side effects, no allocation on the hot path

use regex::Regex;
use thiserror::Error;

/// Why a path failed to yield an API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VersionError {
    /// No `v<digits>/` segment at the start of the path.
    #[error("no version segment")]
    NoVersionMatch,
    /// The segment matched but the number is zero (or does not fit).
    #[error("invalid version number")]
    InvalidVersion,
}

/// A successfully matched version segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionMatch {
    /// Parsed API version, always >= 1.
    pub version: u32,
    /// Byte length of the matched `v<digits>/` prefix.
    pub consumed: usize,
}

/// Precompiled path patterns.
#[derive(Debug, Clone)]
pub struct PatternTable {
    version: Regex,
}

impl PatternTable {
    /// Compile all patterns.
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            version: Regex::new(r"^v([0-9]+)/")?,
        })
    }

    /// Match a leading version segment.
    ///
    /// `path` must already have the mount prefix stripped. An empty path never
    /// carries a version and is reported as `NoVersionMatch`.
    pub fn match_version(&self, path: &str) -> Result<VersionMatch, VersionError> {
        if path.is_empty() {
            return Err(VersionError::NoVersionMatch);
        }

        let caps = self
            .version
            .captures(path)
            .ok_or(VersionError::NoVersionMatch)?;

        let whole = caps.get(0).ok_or(VersionError::NoVersionMatch)?;
        let digits = caps.get(1).ok_or(VersionError::NoVersionMatch)?;

        // Overflowing digit runs are treated like zero
        let version = digits.as_str().parse::<u32>().unwrap_or(0);
        if version == 0 {
            return Err(VersionError::InvalidVersion);
        }

        Ok(VersionMatch {
            version,
            consumed: whole.end(),
        })
    }
}
