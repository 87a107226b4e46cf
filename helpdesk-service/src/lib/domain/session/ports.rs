use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::LoginOutcome;
use crate::domain::session::models::Principal;
use crate::domain::session::models::RefreshOutcome;
use crate::domain::session::models::RefreshStatus;
use crate::domain::session::models::SessionRecord;
use crate::domain::user::models::UserId;

/// Port for session lifecycle operations.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and open a new session, replacing any previous one.
    ///
    /// # Returns
    /// Access and refresh tokens plus the authenticated user
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Storage` - Session could not be persisted
    /// * `TokenIssuance` - Token signing failed
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, SessionError>;

    /// Exchange a refresh token for a new access token, rotating the refresh
    /// token when its remaining lifetime is below the rotation threshold.
    ///
    /// # Errors
    /// * Any unauthorized-class error - Token invalid, superseded or expired
    /// * `Storage` - Session could not be updated
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, SessionError>;

    /// Close the user's session. Always succeeds from the caller's view.
    async fn logout(&self, user_id: &UserId);

    /// Close the session that `token` belongs to, if it is still the live one.
    ///
    /// The token only needs a valid signature; an expired access token still
    /// closes its own session. Unknown, forged or superseded tokens are
    /// ignored, so repeating the call is harmless.
    async fn logout_with_token(&self, token: &str);

    /// Resolve a bearer access token to the caller's identity.
    ///
    /// # Errors
    /// * Any unauthorized-class error - Token invalid, superseded or expired
    async fn authenticate(&self, access_token: &str) -> Result<Principal, SessionError>;
}

/// Persistence of the single active session per user.
///
/// A missing row is never an error: it is how "never logged in" and
/// "logged out" are represented.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Insert or replace the user's session atomically.
    ///
    /// # Errors
    /// * `Storage` - Database operation failed
    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// Replace only the access token and its expiry, provided the stored
    /// refresh token is still `current_refresh`.
    ///
    /// # Errors
    /// * `SessionMismatch` - Session was replaced or removed since it was checked
    /// * `Storage` - Database operation failed
    async fn update_access_only(
        &self,
        user_id: &UserId,
        current_refresh: &str,
        access_token: &str,
        access_expires_at: DateTime<Utc>,
    ) -> Result<(), SessionError>;

    /// Replace both tokens of `record.user_id`, provided the stored refresh
    /// token is still `current_refresh`.
    ///
    /// # Errors
    /// * `SessionMismatch` - Session was replaced or removed since it was checked
    /// * `Storage` - Database operation failed
    async fn rotate(
        &self,
        current_refresh: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionError>;

    /// True iff a row exists and its access token equals `access_token`.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Database could not be queried
    async fn is_access_valid(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<bool, SessionError>;

    /// Compare `refresh_token` with the stored one and check stored expiry.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Database could not be queried
    async fn is_refresh_valid(
        &self,
        user_id: &UserId,
        refresh_token: &str,
    ) -> Result<RefreshStatus, SessionError>;

    /// Remove the user's session; removing nothing is not an error.
    ///
    /// # Errors
    /// * `Storage` - Database operation failed
    async fn delete(&self, user_id: &UserId) -> Result<(), SessionError>;

    /// Remove the user's session only if `token` is its stored access or
    /// refresh token.
    ///
    /// # Returns
    /// True if a session was removed
    ///
    /// # Errors
    /// * `Storage` - Database operation failed
    async fn delete_if_current(
        &self,
        user_id: &UserId,
        token: &str,
    ) -> Result<bool, SessionError>;
}
