use thiserror::Error;

/// Error type for token operations.
///
/// `Expired`, `Malformed` and `SignatureInvalid` are kept apart so callers
/// can log why a token was rejected; none of them should be surfaced to a
/// client verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing key is unusable: {0}")]
    InvalidKey(String),

    #[error("Failed to encode token: {0}")]
    Encoding(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature is invalid")]
    SignatureInvalid,
}
