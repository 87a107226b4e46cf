use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Access tokens authorize API calls, so they carry the role and the coarse
/// write-permission flag alongside the subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user identifier)
    pub sub: i64,

    /// Role name, e.g. `Admin` or `Staff`
    pub role: String,

    /// Whether the holder may create and modify records
    pub can_write: bool,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

/// Claims carried by a refresh token.
///
/// Unknown fields are rejected so that an access token can never be
/// accepted where a refresh token is expected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    /// Subject (user identifier)
    pub sub: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

/// Verified contents of either kind of session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SessionClaims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
}

impl SessionClaims {
    /// Subject user identifier.
    pub fn subject(&self) -> i64 {
        match self {
            SessionClaims::Access(c) => c.sub,
            SessionClaims::Refresh(c) => c.sub,
        }
    }

    /// Expiration as a Unix timestamp.
    pub fn expires_at(&self) -> i64 {
        match self {
            SessionClaims::Access(c) => c.exp,
            SessionClaims::Refresh(c) => c.exp,
        }
    }

    /// Check if the token is expired at `current_timestamp`, allowing
    /// `leeway` seconds of clock skew.
    pub fn is_expired(&self, current_timestamp: i64, leeway: i64) -> bool {
        self.expires_at() < current_timestamp - leeway
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access() -> AccessClaims {
        AccessClaims {
            sub: 42,
            role: "Staff".to_string(),
            can_write: true,
            iat: 1000,
            exp: 2200,
            jti: "a".to_string(),
        }
    }

    #[test]
    fn test_access_json_parses_as_access_variant() {
        let json = serde_json::to_string(&access()).unwrap();
        let parsed: SessionClaims = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, SessionClaims::Access(access()));
    }

    #[test]
    fn test_refresh_json_parses_as_refresh_variant() {
        let json = r#"{"sub":42,"iat":1000,"exp":9000,"jti":"r"}"#;
        let parsed: SessionClaims = serde_json::from_str(json).unwrap();

        assert!(matches!(parsed, SessionClaims::Refresh(ref c) if c.sub == 42));
        assert_eq!(parsed.subject(), 42);
    }

    #[test]
    fn test_refresh_claims_reject_access_payload() {
        let json = serde_json::to_string(&access()).unwrap();
        let result = serde_json::from_str::<RefreshClaims>(&json);

        assert!(result.is_err());
    }

    #[test]
    fn test_access_claims_reject_refresh_payload() {
        let json = r#"{"sub":42,"iat":1000,"exp":9000,"jti":"r"}"#;
        let result = serde_json::from_str::<AccessClaims>(json);

        assert!(result.is_err());
    }

    #[test]
    fn test_is_expired() {
        let claims = SessionClaims::Access(access());

        assert!(!claims.is_expired(2199, 0));
        assert!(!claims.is_expired(2200, 0)); // Exactly at expiration
        assert!(claims.is_expired(2201, 0));
        assert!(!claims.is_expired(2230, 60)); // Within leeway
    }
}
