use std::sync::Arc;

use async_trait::async_trait;
use auth::Clock;
use auth::IssuedToken;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Duration;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::LoginOutcome;
use crate::domain::session::models::Principal;
use crate::domain::session::models::RefreshOutcome;
use crate::domain::session::models::RefreshStatus;
use crate::domain::session::models::SessionRecord;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// Domain service implementing the session lifecycle.
///
/// Login replaces whatever session the user had, so at most one token pair
/// is live per user. Refresh issues a new access token every time and a new
/// refresh token only once the current one is within `rotation_threshold`
/// of expiring.
pub struct SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    users: Arc<UR>,
    store: Arc<SS>,
    codec: Arc<TokenCodec>,
    password_hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    rotation_threshold: Duration,
}

impl<UR, SS> SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User directory lookup
    /// * `store` - Session persistence
    /// * `codec` - Token signing and verification
    /// * `clock` - Time source for rotation decisions
    /// * `rotation_threshold` - Remaining refresh lifetime below which refresh rotates
    pub fn new(
        users: Arc<UR>,
        store: Arc<SS>,
        codec: Arc<TokenCodec>,
        clock: Arc<dyn Clock>,
        rotation_threshold: Duration,
    ) -> Self {
        Self {
            users,
            store,
            codec,
            password_hasher: PasswordHasher::new(),
            clock,
            rotation_threshold,
        }
    }

    fn issue_access(&self, user: &User) -> Result<IssuedToken, SessionError> {
        Ok(self
            .codec
            .issue_access(user.id.0, user.role.as_str(), user.can_write)?)
    }

    async fn check_credentials(&self, command: &LoginCommand) -> Result<User, SessionError> {
        let user = self
            .users
            .find_by_email(&command.email)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        let Some(user) = user else {
            self.password_hasher.verify_dummy(&command.password);
            return Err(SessionError::InvalidCredentials);
        };

        match self
            .password_hasher
            .verify(&command.password, &user.password_hash)
        {
            Ok(true) => Ok(user),
            Ok(false) => Err(SessionError::InvalidCredentials),
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                Err(SessionError::InvalidCredentials)
            }
        }
    }

    async fn try_login(&self, command: LoginCommand) -> Result<LoginOutcome, SessionError> {
        let user = self.check_credentials(&command).await?;

        let access = self.issue_access(&user)?;
        let refresh = self.codec.issue_refresh(user.id.0)?;

        self.store
            .save(&SessionRecord::new(user.id, &access, &refresh))
            .await?;

        tracing::info!(user_id = %user.id, "Session opened");

        Ok(LoginOutcome {
            access,
            refresh,
            user,
        })
    }

    async fn try_refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, SessionError> {
        let claims = self.codec.verify_refresh(refresh_token)?;
        let user_id = UserId(claims.sub);

        let refresh_expires_at = match self.store.is_refresh_valid(&user_id, refresh_token).await? {
            RefreshStatus::Valid { expires_at } => expires_at,
            RefreshStatus::Mismatch { .. } => return Err(SessionError::SessionMismatch),
            RefreshStatus::Expired { .. } => return Err(SessionError::SessionExpired),
            RefreshStatus::NotFound => return Err(SessionError::SessionNotFound),
        };

        // Role and write grant may have changed since login.
        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(|e| SessionError::StoreUnavailable(e.to_string()))?
            .ok_or(SessionError::SessionNotFound)?;

        let access = self.issue_access(&user)?;
        let remaining = refresh_expires_at - self.clock.now();

        if remaining < self.rotation_threshold {
            let refresh = self.codec.issue_refresh(user_id.0)?;
            self.store
                .rotate(refresh_token, &SessionRecord::new(user_id, &access, &refresh))
                .await?;

            tracing::info!(user_id = %user_id, "Refresh token rotated");

            return Ok(RefreshOutcome {
                access,
                refresh,
                rotated: true,
            });
        }

        self.store
            .update_access_only(&user_id, refresh_token, &access.token, access.expires_at)
            .await?;

        tracing::debug!(user_id = %user_id, "Access token refreshed");

        Ok(RefreshOutcome {
            access,
            refresh: IssuedToken {
                token: refresh_token.to_string(),
                expires_at: refresh_expires_at,
            },
            rotated: false,
        })
    }

    async fn try_authenticate(&self, access_token: &str) -> Result<Principal, SessionError> {
        let claims = self.codec.verify_access(access_token)?;
        let user_id = UserId(claims.sub);

        if !self.store.is_access_valid(&user_id, access_token).await? {
            return Err(SessionError::SessionMismatch);
        }

        let role = claims
            .role
            .parse::<Role>()
            .map_err(|e| SessionError::TokenMalformed(e.to_string()))?;

        Ok(Principal {
            user_id,
            role,
            can_write: claims.can_write,
        })
    }
}

fn log_failure(operation: &'static str, err: &SessionError) {
    if err.is_unauthorized() {
        tracing::warn!(operation, reason = %err, "Session check rejected");
    } else {
        tracing::error!(operation, error = %err, "Session operation failed");
    }
}

#[async_trait]
impl<UR, SS> SessionServicePort for SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, SessionError> {
        self.try_login(command).await.map_err(|e| {
            log_failure("login", &e);
            e
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome, SessionError> {
        self.try_refresh(refresh_token).await.map_err(|e| {
            log_failure("refresh", &e);
            e
        })
    }

    async fn logout(&self, user_id: &UserId) {
        if let Err(e) = self.store.delete(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to delete session on logout");
            return;
        }

        tracing::info!(user_id = %user_id, "Session closed");
    }

    async fn logout_with_token(&self, token: &str) {
        let user_id = match self.codec.subject_ignoring_expiry(token) {
            Ok(sub) => UserId(sub),
            Err(e) => {
                tracing::debug!(reason = %e, "Logout without a usable token");
                return;
            }
        };

        match self.store.delete_if_current(&user_id, token).await {
            Ok(true) => tracing::info!(user_id = %user_id, "Session closed"),
            Ok(false) => tracing::debug!(user_id = %user_id, "No live session for logout token"),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to delete session on logout")
            }
        }
    }

    async fn authenticate(&self, access_token: &str) -> Result<Principal, SessionError> {
        self.try_authenticate(access_token).await.map_err(|e| {
            log_failure("authenticate", &e);
            e
        })
    }
}
