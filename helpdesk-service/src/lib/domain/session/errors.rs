use auth::TokenError;
use thiserror::Error;

/// Session lifecycle failures.
///
/// The distinctions exist for logs only: every variant for which
/// [`SessionError::is_unauthorized`] is true must reach the client as the
/// same generic 401.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token is malformed: {0}")]
    TokenMalformed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    #[error("No active session")]
    SessionNotFound,

    #[error("Token does not match the active session")]
    SessionMismatch,

    #[error("Session is expired")]
    SessionExpired,

    /// The store could not answer a validity check
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store could not persist a session change
    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),
}

impl SessionError {
    /// True for every failure that means "this caller is not authenticated".
    ///
    /// Store outages during validity checks count as unauthorized: checks
    /// fail closed.
    pub fn is_unauthorized(&self) -> bool {
        !matches!(
            self,
            SessionError::Storage(_) | SessionError::TokenIssuance(_)
        )
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(msg) => SessionError::TokenMalformed(msg),
            TokenError::Expired => SessionError::TokenExpired,
            TokenError::SignatureInvalid => SessionError::TokenSignatureInvalid,
            TokenError::InvalidKey(msg) | TokenError::Encoding(msg) => {
                SessionError::TokenIssuance(msg)
            }
        }
    }
}
