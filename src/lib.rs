//! Compiles a declarative set of directives into a `Content-Security-Policy`
//! header value, with per response nonces and hashes for inline content.
//!
//! ```
//! use cspforge::{name, Directive, HashAlgorithm, Policy};
//!
//! let mut policy = Policy::starter();
//! policy
//!     .with(
//!         name::SCRIPT_SRC,
//!         Directive::SELF_ONLY.nonce().hash(HashAlgorithm::Sha256, "init()"),
//!     )
//!     .set_report_uri("/_csp-report");
//! policy.build();
//!
//! let (header, nonce) = policy.with_nonce().unwrap();
//! assert!(header.contains(&nonce.unwrap().source()));
//! ```

mod additions;
pub mod config;
mod directive;
mod error;
pub mod filters;
mod hash;
pub mod name;
mod nonce;
mod policy;
mod request;
mod serde;
mod shared;
pub mod source;

pub use crate::{
    additions::Additions,
    directive::Directive,
    error::Error,
    hash::{hash_source, HashAlgorithm},
    nonce::{Nonce, DEFAULT_PLACEHOLDER, NONCE_LEN},
    policy::{Compiled, Policy},
    request::RequestPolicy,
    shared::{SharedPolicy, HEADER, REPORT_ONLY_HEADER},
    source::{Keyword, Scheme},
};
