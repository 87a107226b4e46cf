use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::middleware::extract_bearer_token;
use crate::inbound::http::router::AppState;

/// Close the caller's session.
///
/// Needs no live session: an expired access token or a refresh token in the body
/// is enough, and a caller that is already logged out still gets 200.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<LogoutRequestBody>>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok()
        .map(str::to_string)
        .or_else(|| body.and_then(|Json(body)| body.refresh_token));

    if let Some(token) = token {
        state.session_service.logout_with_token(&token).await;
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LogoutResponseData {
            message: "Logged out".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogoutRequestBody {
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {
    pub message: String,
}
