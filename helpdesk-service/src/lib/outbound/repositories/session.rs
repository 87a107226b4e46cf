use std::sync::Arc;

use async_trait::async_trait;
use auth::Clock;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::RefreshStatus;
use crate::domain::session::models::SessionRecord;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::UserId;

/// Session store over the `user_sessions` table.
///
/// The table is keyed by `user_id`, so the upsert in [`SessionStore::save`]
/// is what enforces a single live session per user, even under concurrent
/// logins. Refresh writes are conditional on the refresh token that was
/// checked, so a refresh racing a login can never resurrect the old session.
pub struct PostgresSessionStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn storage_error(e: sqlx::Error) -> SessionError {
    SessionError::Storage(e.to_string())
}

fn unavailable(e: sqlx::Error) -> SessionError {
    SessionError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions
                (user_id, access_token, refresh_token, access_expires_at, refresh_expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                access_expires_at = EXCLUDED.access_expires_at,
                refresh_expires_at = EXCLUDED.refresh_expires_at,
                updated_at = NOW()
            "#,
        )
        .bind(record.user_id.0)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(record.access_expires_at)
        .bind(record.refresh_expires_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn update_access_only(
        &self,
        user_id: &UserId,
        current_refresh: &str,
        access_token: &str,
        access_expires_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET access_token = $2, access_expires_at = $3, updated_at = NOW()
            WHERE user_id = $1 AND refresh_token = $4
            "#,
        )
        .bind(user_id.0)
        .bind(access_token)
        .bind(access_expires_at)
        .bind(current_refresh)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        // A login or logout got in between the refresh check and this write.
        if result.rows_affected() == 0 {
            return Err(SessionError::SessionMismatch);
        }

        Ok(())
    }

    async fn rotate(
        &self,
        current_refresh: &str,
        record: &SessionRecord,
    ) -> Result<(), SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET access_token = $2,
                refresh_token = $3,
                access_expires_at = $4,
                refresh_expires_at = $5,
                updated_at = NOW()
            WHERE user_id = $1 AND refresh_token = $6
            "#,
        )
        .bind(record.user_id.0)
        .bind(&record.access_token)
        .bind(&record.refresh_token)
        .bind(record.access_expires_at)
        .bind(record.refresh_expires_at)
        .bind(current_refresh)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(SessionError::SessionMismatch);
        }

        Ok(())
    }

    async fn is_access_valid(
        &self,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<bool, SessionError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM user_sessions WHERE user_id = $1 AND access_token = $2
            )
            "#,
        )
        .bind(user_id.0)
        .bind(access_token)
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn is_refresh_valid(
        &self,
        user_id: &UserId,
        refresh_token: &str,
    ) -> Result<RefreshStatus, SessionError> {
        let row = sqlx::query_as::<_, (String, DateTime<Utc>)>(
            r#"
            SELECT refresh_token, refresh_expires_at
            FROM user_sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(match row {
            Some((stored, expires_at)) => {
                RefreshStatus::classify(&stored, expires_at, refresh_token, self.clock.now())
            }
            None => RefreshStatus::NotFound,
        })
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn delete_if_current(
        &self,
        user_id: &UserId,
        token: &str,
    ) -> Result<bool, SessionError> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_sessions
            WHERE user_id = $1 AND (access_token = $2 OR refresh_token = $2)
            "#,
        )
        .bind(user_id.0)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }
}
