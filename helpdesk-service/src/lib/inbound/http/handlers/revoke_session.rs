use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Force-close another user's session. Admin only.
pub async fn revoke_session(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user_id = UserId(user_id);

    state.session_service.logout(&user_id).await;

    tracing::info!(admin_id = %admin.user_id, user_id = %user_id, "Session revoked by admin");

    Ok(StatusCode::NO_CONTENT)
}
