use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::get_work_order::WorkOrderData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn take_work_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(principal)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    state
        .work_order_service
        .take_work_order(&principal, &WorkOrderId(id))
        .await
        .map_err(ApiError::from)
        .map(|ref work_order| ApiSuccess::new(StatusCode::OK, work_order.into()))
}
