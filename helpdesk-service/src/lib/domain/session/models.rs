use auth::IssuedToken;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// The single active token pair for a user.
///
/// Exactly one record exists per user; a new login replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(user_id: UserId, access: &IssuedToken, refresh: &IssuedToken) -> Self {
        Self {
            user_id,
            access_token: access.token.clone(),
            refresh_token: refresh.token.clone(),
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        }
    }
}

/// Outcome of checking a presented refresh token against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    Valid { expires_at: DateTime<Utc> },
    /// A row exists but holds a different refresh token
    Mismatch { expires_at: DateTime<Utc> },
    /// The presented token matches but the stored expiry has passed
    Expired { expires_at: DateTime<Utc> },
    NotFound,
}

impl RefreshStatus {
    /// Classify a stored refresh token against the presented one.
    pub fn classify(
        stored_token: &str,
        stored_expires_at: DateTime<Utc>,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Self {
        if stored_token != presented {
            RefreshStatus::Mismatch {
                expires_at: stored_expires_at,
            }
        } else if now < stored_expires_at {
            RefreshStatus::Valid {
                expires_at: stored_expires_at,
            }
        } else {
            RefreshStatus::Expired {
                expires_at: stored_expires_at,
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RefreshStatus::Valid { .. })
    }

    /// Stored refresh expiry, whatever the match outcome.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            RefreshStatus::Valid { expires_at }
            | RefreshStatus::Mismatch { expires_at }
            | RefreshStatus::Expired { expires_at } => Some(*expires_at),
            RefreshStatus::NotFound => None,
        }
    }
}

/// Login request with a validated identity.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: EmailAddress, password: String) -> Self {
        Self { email, password }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
    pub user: User,
}

/// Result of a refresh.
///
/// `refresh` is the token the client should hold from now on: the presented
/// one when `rotated` is false, a newly issued one otherwise.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
    pub rotated: bool,
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
    pub can_write: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may always write; everyone else needs the explicit grant.
    pub fn may_write(&self) -> bool {
        self.can_write || self.is_admin()
    }
}
