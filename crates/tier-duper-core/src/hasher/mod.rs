pub mod checksum;

use base64::Engine as _;
use serde::Deserialize;
use std::fmt;

pub use checksum::ContentChecksummer;

/// Digest used to compare file content against catalog-declared checksums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Text encoding applied to the raw digest bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumEncoding {
    #[default]
    Base64,
    Hex,
}

impl ChecksumEncoding {
    pub fn encode(self, digest: &[u8]) -> String {
        match self {
            ChecksumEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(digest),
            ChecksumEncoding::Hex => hex::encode(digest),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Sha1 => write!(f, "sha1"),
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl fmt::Display for ChecksumEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumEncoding::Base64 => write!(f, "base64"),
            ChecksumEncoding::Hex => write!(f, "hex"),
        }
    }
}
