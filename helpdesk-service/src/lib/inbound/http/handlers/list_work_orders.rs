use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::get_work_order::WorkOrderData;
use super::ApiError;
use super::ApiQuery;
use super::ApiSuccess;
use crate::domain::work_order::models::PageRequest;
use crate::domain::work_order::models::StatusFilter;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderPage;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::inbound::http::router::AppState;

/// List work orders, newest first.
///
/// Filters: `status` (a status name or `active`), `unit`, `requester_unit`
/// and `date=today`. Paging: `page` (from 1) and `limit`.
pub async fn list_work_orders(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListWorkOrdersParams>,
) -> Result<ApiSuccess<WorkOrderListData>, ApiError> {
    let filter = params.filter()?;
    let page = PageRequest::new(params.page, params.limit);

    state
        .work_order_service
        .list_work_orders(filter, page)
        .await
        .map_err(ApiError::from)
        .map(|ref page| ApiSuccess::new(StatusCode::OK, page.into()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListWorkOrdersParams {
    status: Option<String>,
    unit: Option<String>,
    requester_unit: Option<String>,
    date: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ListWorkOrdersParams {
    fn filter(&self) -> Result<WorkOrderFilter, ApiError> {
        let status = match non_empty(&self.status) {
            Some(status) => status
                .parse::<StatusFilter>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
            None => StatusFilter::Any,
        };

        let created_today = match non_empty(&self.date).as_deref() {
            None => false,
            Some("today") => true,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "Unknown date filter: {}",
                    other
                )))
            }
        };

        Ok(WorkOrderFilter {
            status,
            unit: non_empty(&self.unit),
            requester_unit: non_empty(&self.requester_unit),
            created_today,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkOrderListData {
    pub items: Vec<WorkOrderData>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
    pub limit: u32,
}

impl From<&WorkOrderPage> for WorkOrderListData {
    fn from(page: &WorkOrderPage) -> Self {
        Self {
            items: page.items.iter().map(WorkOrderData::from).collect(),
            meta: PaginationMeta {
                current_page: page.page.page(),
                total_pages: page.total_pages(),
                total_items: page.total_items,
                limit: page.page.limit(),
            },
        }
    }
}
