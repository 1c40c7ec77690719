use crate::error::Error;
use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::{convert::TryFrom, fmt, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn bits(self) -> u16 {
        match self {
            HashAlgorithm::Sha256 => 256,
            HashAlgorithm::Sha384 => 384,
            HashAlgorithm::Sha512 => 512,
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        HashAlgorithm::Sha256
    }
}

impl TryFrom<u16> for HashAlgorithm {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            256 => Ok(HashAlgorithm::Sha256),
            384 => Ok(HashAlgorithm::Sha384),
            512 => Ok(HashAlgorithm::Sha512),
            other => Err(Error::UnsupportedHashAlgorithm(other)),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s.trim_start_matches("sha");
        bits.parse::<u16>()
            .map_err(|_| Error::Parse(format!("Unknown hash algorithm {}", s)))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sha{}", self.bits())
    }
}

/// Hash-source literal for `content`, e.g. `'sha256-<base64>'`.
pub fn hash_source(algorithm: HashAlgorithm, content: impl AsRef<[u8]>) -> String {
    let content = content.as_ref();
    let digest = match algorithm {
        HashAlgorithm::Sha256 => general_purpose::STANDARD.encode(Sha256::digest(content)),
        HashAlgorithm::Sha384 => general_purpose::STANDARD.encode(Sha384::digest(content)),
        HashAlgorithm::Sha512 => general_purpose::STANDARD.encode(Sha512::digest(content)),
    };

    format!("'{}-{}'", algorithm, digest)
}
