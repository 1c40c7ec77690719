use std::{fmt, str::FromStr};

pub const NONE: &str = "'none'";
pub const WILDCARD: &str = "*";
pub const SELF: &str = "'self'";
pub const STRICT_DYNAMIC: &str = "'strict-dynamic'";
pub const UNSAFE_INLINE: &str = "'unsafe-inline'";
pub const UNSAFE_EVAL: &str = "'unsafe-eval'";
pub const UNSAFE_ALLOW_REDIRECTS: &str = "'unsafe-allow-redirects'";
pub const UNSAFE_HASHES: &str = "'unsafe-hashes'";
pub const REPORT_SAMPLE: &str = "'report-sample'";
// require-trusted-types-for 'script'
pub const TRUSTED_SCRIPT: &str = "'script'";

pub const BLOB: &str = "blob:";
pub const DATA: &str = "data:";
pub const MEDIASTREAM: &str = "mediastream:";
pub const FILESYSTEM: &str = "filesystem:";

/// Keyword sources a `Directive` can carry as flags.
///
/// `VARIANTS` is also the render order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    StrictDynamic,
    SelfOrigin,
    UnsafeInline,
    UnsafeEval,
    UnsafeAllowRedirects,
    UnsafeHashes,
}

impl Keyword {
    pub const VARIANTS: &'static [Keyword] = &[
        Keyword::StrictDynamic,
        Keyword::SelfOrigin,
        Keyword::UnsafeInline,
        Keyword::UnsafeEval,
        Keyword::UnsafeAllowRedirects,
        Keyword::UnsafeHashes,
    ];

    pub const COUNT: usize = Self::VARIANTS.len();

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::StrictDynamic => STRICT_DYNAMIC,
            Keyword::SelfOrigin => SELF,
            Keyword::UnsafeInline => UNSAFE_INLINE,
            Keyword::UnsafeEval => UNSAFE_EVAL,
            Keyword::UnsafeAllowRedirects => UNSAFE_ALLOW_REDIRECTS,
            Keyword::UnsafeHashes => UNSAFE_HASHES,
        }
    }
}

/// Scheme sources, rendered after keywords in `VARIANTS` order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scheme {
    Blob,
    Data,
    Mediastream,
    Filesystem,
}

impl Scheme {
    pub const VARIANTS: &'static [Scheme] = &[
        Scheme::Blob,
        Scheme::Data,
        Scheme::Mediastream,
        Scheme::Filesystem,
    ];

    pub const COUNT: usize = Self::VARIANTS.len();

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Blob => BLOB,
            Scheme::Data => DATA,
            Scheme::Mediastream => MEDIASTREAM,
            Scheme::Filesystem => FILESYSTEM,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown source token")]
pub struct UnknownToken;

impl FromStr for Keyword {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|keyword| keyword.as_str() == s)
            .ok_or(UnknownToken)
    }
}

impl FromStr for Scheme {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|scheme| scheme.as_str() == s)
            .ok_or(UnknownToken)
    }
}
