//! Content checksums for template integrity checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
    Sha1,
}

impl ChecksumAlgorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
        }
    }

    fn digest_hex(&self, content: &str) -> String {
        match self {
            Self::Sha256 => hex::encode(Sha256::digest(content.as_bytes())),
            Self::Sha1 => hex::encode(Sha1::digest(content.as_bytes())),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha1" => Ok(Self::Sha1),
            _ => Err(DomainError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Hex digest of some content plus the algorithm that produced it.
///
/// String form: `"{algorithm}:{hexDigest}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateChecksum {
    algorithm: ChecksumAlgorithm,
    digest: String,
}

impl TemplateChecksum {
    /// Hash `content` with the algorithm named by `algorithm`.
    ///
    /// # Errors
    ///
    /// `UnsupportedAlgorithm` for anything other than `sha256`/`sha1`.
    pub fn create(content: &str, algorithm: &str) -> Result<Self, DomainError> {
        Ok(Self::compute(content, algorithm.parse()?))
    }

    pub fn compute(content: &str, algorithm: ChecksumAlgorithm) -> Self {
        Self {
            algorithm,
            digest: algorithm.digest_hex(content),
        }
    }

    /// Parse `"{algorithm}:{hexDigest}"`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (algorithm, digest) = s.split_once(':').ok_or_else(|| DomainError::InvalidFormat {
            value: s.to_string(),
            reason: "expected algorithm:digest".into(),
        })?;
        let algorithm: ChecksumAlgorithm = algorithm.parse()?;
        if digest.is_empty() || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidFormat {
                value: s.to_string(),
                reason: "digest must be hexadecimal".into(),
            });
        }
        Ok(Self {
            algorithm,
            digest: digest.to_ascii_lowercase(),
        })
    }

    /// Recompute over `content` and compare.
    pub fn verify(&self, content: &str) -> bool {
        self.algorithm.digest_hex(content) == self.digest
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for TemplateChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.digest)
    }
}
