use thiserror::Error;

/// Credential verifier failures.
///
/// A wrong password is not an error (`verify` returns `Ok(false)`); these
/// variants only cover broken hashing or an unreadable stored hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is unusable: {0}")]
    VerificationFailed(String),
}
