//! Template versions: `major.minor.patch[-prerelease]`.
//!
//! Ordering is a simplification of semver: the numeric triple decides first,
//! a release beats any prerelease of the same triple, and two prereleases are
//! compared as plain strings (`beta.10` < `beta.2`). Full dot-separated
//! prerelease precedence is not implemented.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::DomainError;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-([0-9A-Za-z.-]+))?$")
        .expect("version pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
}

impl TemplateVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// `InvalidVersionFormat` unless `s` is `major.minor.patch[-prerelease]`
    /// with no leading zeros in the numeric parts.
    pub fn create(s: &str) -> Result<Self, DomainError> {
        let caps = VERSION
            .captures(s)
            .ok_or_else(|| DomainError::InvalidVersionFormat(s.to_string()))?;

        let number = |i: usize| {
            caps[i]
                .parse::<u64>()
                .map_err(|_| DomainError::InvalidVersionFormat(s.to_string()))
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease: caps.get(4).map(|m| m.as_str().to_string()),
        })
    }

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    pub fn with_prerelease(mut self, tag: impl Into<String>) -> Self {
        self.prerelease = Some(tag.into());
        self
    }

    pub const fn major(&self) -> u64 {
        self.major
    }

    pub const fn minor(&self) -> u64 {
        self.minor
    }

    pub const fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    /// # Errors
    ///
    /// `InvalidVersionFormat` if the component would overflow.
    pub fn increment_major(&self) -> Result<Self, DomainError> {
        Ok(Self::new(self.bump(self.major)?, 0, 0))
    }

    pub fn increment_minor(&self) -> Result<Self, DomainError> {
        Ok(Self::new(self.major, self.bump(self.minor)?, 0))
    }

    pub fn increment_patch(&self) -> Result<Self, DomainError> {
        Ok(Self::new(self.major, self.minor, self.bump(self.patch)?))
    }

    fn bump(&self, component: u64) -> Result<u64, DomainError> {
        component
            .checked_add(1)
            .ok_or_else(|| DomainError::InvalidVersionFormat(self.to_string()))
    }

    /// Same major component.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major
    }

    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

impl Default for TemplateVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl Ord for TemplateVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for TemplateVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for TemplateVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::create(s)
    }
}

impl Serialize for TemplateVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TemplateVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::create(&raw).map_err(serde::de::Error::custom)
    }
}
