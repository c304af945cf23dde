//! Content digests (`<algorithm>:<encoded>`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use keel_core::error::{KeelError, Result};

/// A validated content digest.
///
/// Both components are restricted to characters that cannot form a path
/// separator, so a digest can be joined onto a blob directory safely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: String,
    encoded: String,
}

impl Digest {
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Path of this blob under an OCI layout root: `blobs/<alg>/<encoded>`.
    pub fn blob_path(&self, layout_root: &Path) -> PathBuf {
        layout_root
            .join("blobs")
            .join(&self.algorithm)
            .join(&self.encoded)
    }
}

impl FromStr for Digest {
    type Err = KeelError;

    fn from_str(s: &str) -> Result<Self> {
        let (algorithm, encoded) = s
            .split_once(':')
            .ok_or_else(|| KeelError::InvalidDigest(s.to_string()))?;

        let algorithm_ok = !algorithm.is_empty()
            && algorithm
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c));
        let encoded_ok = !encoded.is_empty()
            && encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "=_-".contains(c));

        if !algorithm_ok || !encoded_ok {
            return Err(KeelError::InvalidDigest(s.to_string()));
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            encoded: encoded.to_string(),
        })
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.encoded)
    }
}
