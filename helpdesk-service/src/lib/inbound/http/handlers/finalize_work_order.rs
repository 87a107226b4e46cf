use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::get_work_order::WorkOrderData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Close a work order; the completion note is optional.
pub async fn finalize_work_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(principal)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    body: Option<Json<FinalizeWorkOrderRequestBody>>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    let note = body.map(|Json(body)| body.note).unwrap_or_default();

    state
        .work_order_service
        .finalize_work_order(&principal, &WorkOrderId(id), note)
        .await
        .map_err(ApiError::from)
        .map(|ref work_order| ApiSuccess::new(StatusCode::OK, work_order.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FinalizeWorkOrderRequestBody {
    #[serde(default)]
    note: String,
}
