use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::get_work_order::WorkOrderData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Hand a work order to a specific user. Admin only.
pub async fn assign_work_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(admin)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<AssignWorkOrderRequestBody>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    state
        .work_order_service
        .assign_work_order(&admin, &WorkOrderId(id), &UserId(body.assignee_id))
        .await
        .map_err(ApiError::from)
        .map(|ref work_order| ApiSuccess::new(StatusCode::OK, work_order.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignWorkOrderRequestBody {
    assignee_id: i64,
}
