use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;
use uuid::Uuid;

use super::claims::AccessClaims;
use super::claims::RefreshClaims;
use super::claims::SessionClaims;
use super::errors::TokenError;
use crate::clock::Clock;

/// Minimum accepted HMAC secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Lifetimes applied to issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Allowed clock skew, in seconds, when checking `exp`
    pub leeway_seconds: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(20),
            refresh_ttl: Duration::days(7),
            leeway_seconds: 0,
        }
    }
}

/// Everything the codec needs to sign and verify tokens.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub policy: TokenPolicy,
}

/// A freshly signed token together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies HS256-signed session tokens.
///
/// Access and refresh tokens share the signing key but carry different,
/// statically typed claim sets. Verification only ever accepts HS256, so
/// `alg: none` or a token signed with another algorithm is rejected.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    policy: TokenPolicy,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec from explicit configuration.
    ///
    /// # Arguments
    /// * `config` - Signing secret and token lifetimes
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    ///
    /// # Errors
    /// * `InvalidKey` - Secret is shorter than [`MIN_SECRET_LENGTH`] bytes
    pub fn new(config: &TokenConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let secret = config.secret.as_bytes();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::InvalidKey(format!(
                "secret must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                secret.len()
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock after decoding.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            policy: config.policy,
            clock,
        })
    }

    /// Issue a short-lived access token.
    ///
    /// # Arguments
    /// * `user_id` - Subject
    /// * `role` - Role name embedded in the token
    /// * `can_write` - Coarse write-permission grant
    ///
    /// # Errors
    /// * `Encoding` - Signing failed
    pub fn issue_access(
        &self,
        user_id: i64,
        role: &str,
        can_write: bool,
    ) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = (now + self.policy.access_ttl).trunc_subsecs(0);

        let claims = AccessClaims {
            sub: user_id,
            role: role.to_string(),
            can_write,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(IssuedToken {
            token: self.encode(&claims)?,
            expires_at,
        })
    }

    /// Issue a long-lived refresh token carrying only the subject.
    ///
    /// # Errors
    /// * `Encoding` - Signing failed
    pub fn issue_refresh(&self, user_id: i64) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = (now + self.policy.refresh_ttl).trunc_subsecs(0);

        let claims = RefreshClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        Ok(IssuedToken {
            token: self.encode(&claims)?,
            expires_at,
        })
    }

    /// Verify signature, algorithm and expiry, returning the typed claims.
    ///
    /// # Errors
    /// * `Malformed` - Not a JWT, unsupported header, or unknown claim shape
    /// * `SignatureInvalid` - Wrong key or unexpected algorithm
    /// * `Expired` - `exp` is in the past
    pub fn parse_and_verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims = self.decode(token)?;

        let now = self.clock.now().timestamp();
        if claims.is_expired(now, self.policy.leeway_seconds) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verify a token that must be an access token.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        match self.parse_and_verify(token)? {
            SessionClaims::Access(claims) => Ok(claims),
            SessionClaims::Refresh(_) => Err(TokenError::Malformed(
                "expected an access token".to_string(),
            )),
        }
    }

    /// Verify a token that must be a refresh token.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        match self.parse_and_verify(token)? {
            SessionClaims::Refresh(claims) => Ok(claims),
            SessionClaims::Access(_) => Err(TokenError::Malformed(
                "expected a refresh token".to_string(),
            )),
        }
    }

    /// Subject of a correctly signed token of either kind, expired or not.
    ///
    /// Only for closing a session: the result must never authorize anything.
    ///
    /// # Errors
    /// * `Malformed` - Not a JWT, unsupported header, or unknown claim shape
    /// * `SignatureInvalid` - Wrong key or unexpected algorithm
    pub fn subject_ignoring_expiry(&self, token: &str) -> Result<i64, TokenError> {
        Ok(self.decode(token)?.subject())
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        _ => TokenError::Malformed(e.to_string()),
    }
}
