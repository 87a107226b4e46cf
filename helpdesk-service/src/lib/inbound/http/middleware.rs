use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::UNAUTHORIZED_MESSAGE;
use crate::domain::session::models::Principal;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::router::AppState;

/// Extension type holding the caller resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

/// Middleware that resolves the bearer token against the active session
/// and adds the caller to request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?.to_string();

    let principal = state.session_service.authenticate(&token).await?;

    req.extensions_mut().insert(AuthenticatedUser(principal));

    Ok(next.run(req).await)
}

/// Middleware that rejects callers without the Admin role.
///
/// Must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = req
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(|user| user.0.is_admin());

    if !is_admin {
        tracing::warn!("Admin route requested by non-admin caller");
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let unauthorized = || ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string());

    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(unauthorized()),
    }
}
