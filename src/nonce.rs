use crate::error::Error;
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Random bytes per nonce, 128 bits.
pub const NONCE_LEN: usize = 16;

/// Placeholder written into compiled policies where a nonce goes.
pub const DEFAULT_PLACEHOLDER: &str = "$NONCE";

/// Single use token for `nonce="..."` attributes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub struct Nonce(String);

impl Nonce {
    /// Draws fresh bytes from the OS random source on every call.
    pub fn generate() -> Result<Self, Error> {
        let mut bytes = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(general_purpose::URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `'nonce-<value>'`
    pub fn source(&self) -> String {
        format!("'nonce-{}'", self.0)
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
