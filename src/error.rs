#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported hash algorithm: sha{0}")]
    UnsupportedHashAlgorithm(u16),

    #[error("Secure random source failed: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("Compiled policy is not a valid header value: {0}")]
    InvalidHeaderValue(#[from] warp::http::header::InvalidHeaderValue),

    #[error("Can't parse policy: {0}")]
    Parse(String),
}

impl warp::reject::Reject for Error {}
