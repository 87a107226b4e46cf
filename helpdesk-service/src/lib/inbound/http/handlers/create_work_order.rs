use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::get_work_order::WorkOrderData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::domain::work_order::models::Priority;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_work_order(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(principal)): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<CreateWorkOrderRequestBody>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    let command = body.try_into_command()?;

    state
        .work_order_service
        .create_work_order(&principal, command)
        .await
        .map_err(ApiError::from)
        .map(|ref work_order| ApiSuccess::new(StatusCode::CREATED, work_order.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateWorkOrderRequestBody {
    title: String,
    #[serde(default)]
    description: String,
    priority: String,
    #[serde(default)]
    unit: String,
}

impl CreateWorkOrderRequestBody {
    fn try_into_command(self) -> Result<CreateWorkOrderCommand, ApiError> {
        let priority = self
            .priority
            .parse::<Priority>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(CreateWorkOrderCommand {
            title: self.title,
            description: self.description,
            priority,
            unit: self.unit,
        })
    }
}
