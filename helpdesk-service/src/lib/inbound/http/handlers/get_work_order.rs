use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::router::AppState;

pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<WorkOrderData>, ApiError> {
    state
        .work_order_service
        .get_work_order(&WorkOrderId(id))
        .await
        .map_err(ApiError::from)
        .map(|ref work_order| ApiSuccess::new(StatusCode::OK, work_order.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderData {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub unit: String,
    pub requester_id: i64,
    pub assignee_id: Option<i64>,
    pub taken_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<i64>,
    pub completion_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&WorkOrder> for WorkOrderData {
    fn from(work_order: &WorkOrder) -> Self {
        Self {
            id: work_order.id.0,
            title: work_order.title.clone(),
            description: work_order.description.clone(),
            priority: work_order.priority.as_str().to_string(),
            status: work_order.status.as_str().to_string(),
            unit: work_order.unit.clone(),
            requester_id: work_order.requester_id.0,
            assignee_id: work_order.assignee_id.map(|id| id.0),
            taken_at: work_order.taken_at,
            completed_at: work_order.completed_at,
            completed_by: work_order.completed_by.map(|id| id.0),
            completion_note: work_order.completion_note.clone(),
            created_at: work_order.created_at,
            updated_at: work_order.updated_at,
        }
    }
}
