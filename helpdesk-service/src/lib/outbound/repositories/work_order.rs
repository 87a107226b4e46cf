use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::UserId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::NewWorkOrder;
use crate::domain::work_order::models::PageRequest;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::models::WorkOrderPage;
use crate::domain::work_order::models::WorkOrderStatus;
use crate::domain::work_order::ports::WorkOrderRepository;

const WORK_ORDER_COLUMNS: &str = "id, title, description, priority, status, unit, \
     requester_id, assignee_id, taken_at, completed_at, completed_by_id, completion_note, \
     created_at, updated_at";

/// Listing predicate; a NULL parameter disables its condition.
///
/// $1 statuses, $2 handling unit, $3 requester unit, $4 created today only.
const LIST_FILTER: &str = "WHERE ($1::TEXT[] IS NULL OR status = ANY($1)) \
     AND ($2::TEXT IS NULL OR unit = $2) \
     AND ($3::TEXT IS NULL OR requester_id IN (SELECT id FROM users WHERE unit = $3)) \
     AND (NOT $4::BOOLEAN OR created_at::DATE = CURRENT_DATE)";

#[derive(FromRow)]
struct WorkOrderRow {
    id: i64,
    title: String,
    description: String,
    priority: String,
    status: String,
    unit: String,
    requester_id: i64,
    assignee_id: Option<i64>,
    taken_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completed_by_id: Option<i64>,
    completion_note: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkOrderRow> for WorkOrder {
    type Error = WorkOrderError;

    fn try_from(r: WorkOrderRow) -> Result<Self, Self::Error> {
        Ok(WorkOrder {
            id: WorkOrderId(r.id),
            title: r.title,
            description: r.description,
            priority: r.priority.parse()?,
            status: r.status.parse()?,
            unit: r.unit,
            requester_id: UserId(r.requester_id),
            assignee_id: r.assignee_id.map(UserId),
            taken_at: r.taken_at,
            completed_at: r.completed_at,
            completed_by: r.completed_by_id.map(UserId),
            completion_note: r.completion_note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub struct PostgresWorkOrderRepository {
    pool: PgPool,
}

impl PostgresWorkOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkOrderRepository for PostgresWorkOrderRepository {
    async fn create(&self, work_order: NewWorkOrder) -> Result<WorkOrder, WorkOrderError> {
        let query = format!(
            r#"
            INSERT INTO work_orders (title, description, priority, status, unit, requester_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            WORK_ORDER_COLUMNS
        );

        let row = sqlx::query_as::<_, WorkOrderRow>(&query)
            .bind(&work_order.title)
            .bind(&work_order.description)
            .bind(work_order.priority.as_str())
            .bind(WorkOrderStatus::Pending.as_str())
            .bind(&work_order.unit)
            .bind(work_order.requester_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &WorkOrderId) -> Result<Option<WorkOrder>, WorkOrderError> {
        let query = format!("SELECT {} FROM work_orders WHERE id = $1", WORK_ORDER_COLUMNS);

        let row = sqlx::query_as::<_, WorkOrderRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        row.map(WorkOrder::try_from).transpose()
    }

    async fn take(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError> {
        // Check and claim happen in one statement so two takers cannot both win.
        let result = sqlx::query(
            r#"
            UPDATE work_orders
            SET status = $3, assignee_id = $2, taken_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND assignee_id IS NULL AND status <> $4
            "#,
        )
        .bind(id.0)
        .bind(assignee.0)
        .bind(WorkOrderStatus::InProgress.as_str())
        .bind(WorkOrderStatus::Completed.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(
        &self,
        filter: &WorkOrderFilter,
        page: PageRequest,
    ) -> Result<WorkOrderPage, WorkOrderError> {
        let statuses: Option<Vec<String>> = filter.status.statuses().map(|statuses| {
            statuses
                .iter()
                .map(|status| status.as_str().to_string())
                .collect()
        });

        let count_query = format!("SELECT COUNT(*) FROM work_orders {}", LIST_FILTER);
        let total_items = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&statuses)
            .bind(&filter.unit)
            .bind(&filter.requester_unit)
            .bind(filter.created_today)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        let list_query = format!(
            "SELECT {} FROM work_orders {} ORDER BY created_at DESC, id DESC LIMIT $5 OFFSET $6",
            WORK_ORDER_COLUMNS, LIST_FILTER
        );
        let rows = sqlx::query_as::<_, WorkOrderRow>(&list_query)
            .bind(&statuses)
            .bind(&filter.unit)
            .bind(&filter.requester_unit)
            .bind(filter.created_today)
            .bind(i64::from(page.limit()))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        let items = rows
            .into_iter()
            .map(WorkOrder::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkOrderPage {
            items,
            page,
            total_items,
        })
    }

    async fn assign(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError> {
        let result = sqlx::query(
            r#"
            UPDATE work_orders
            SET status = $3,
                assignee_id = $2,
                taken_at = COALESCE(taken_at, NOW()),
                updated_at = NOW()
            WHERE id = $1 AND status <> $4
            "#,
        )
        .bind(id.0)
        .bind(assignee.0)
        .bind(WorkOrderStatus::InProgress.as_str())
        .bind(WorkOrderStatus::Completed.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn finalize(
        &self,
        id: &WorkOrderId,
        completed_by: &UserId,
        note: &str,
    ) -> Result<bool, WorkOrderError> {
        let result = sqlx::query(
            r#"
            UPDATE work_orders
            SET status = $4,
                completion_note = $3,
                completed_by_id = $2,
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(id.0)
        .bind(completed_by.0)
        .bind(note)
        .bind(WorkOrderStatus::Completed.as_str())
        .bind(WorkOrderStatus::InProgress.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
