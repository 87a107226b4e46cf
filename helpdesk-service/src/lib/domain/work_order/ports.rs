use async_trait::async_trait;

use crate::domain::session::models::Principal;
use crate::domain::user::models::UserId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::domain::work_order::models::NewWorkOrder;
use crate::domain::work_order::models::PageRequest;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::models::WorkOrderPage;

/// Port for work order operations performed by an authenticated caller.
#[async_trait]
pub trait WorkOrderServicePort: Send + Sync + 'static {
    /// Raise a work order for another unit.
    ///
    /// # Errors
    /// * `Forbidden` - Caller lacks write permission
    /// * `Validation` - Empty title, empty unit, or the caller's own unit
    /// * `DatabaseError` - Database operation failed
    async fn create_work_order(
        &self,
        actor: &Principal,
        command: CreateWorkOrderCommand,
    ) -> Result<WorkOrder, WorkOrderError>;

    /// # Errors
    /// * `NotFound` - No work order with this id
    async fn get_work_order(&self, id: &WorkOrderId) -> Result<WorkOrder, WorkOrderError>;

    /// List work orders matching `filter`, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_work_orders(
        &self,
        filter: WorkOrderFilter,
        page: PageRequest,
    ) -> Result<WorkOrderPage, WorkOrderError>;

    /// Claim a work order addressed to the caller's unit.
    ///
    /// # Errors
    /// * `NotFound` - No work order with this id
    /// * `Forbidden` - Work order targets another unit
    /// * `AlreadyCompleted` - Work order is closed
    /// * `AlreadyTaken` - Somebody else holds it
    async fn take_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
    ) -> Result<WorkOrder, WorkOrderError>;

    /// Hand a work order to a specific user. Admin only.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an administrator
    /// * `AssigneeNotFound` - No user with `assignee` id
    /// * `NotFound` - No work order with this id
    /// * `AlreadyCompleted` - Work order is closed
    async fn assign_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
        assignee: &UserId,
    ) -> Result<WorkOrder, WorkOrderError>;

    /// Close a work order the caller is working on.
    ///
    /// # Errors
    /// * `NotFound` - No work order with this id
    /// * `AlreadyCompleted` - Work order is closed
    /// * `NotTaken` - Nobody has taken the work order yet
    /// * `Forbidden` - Caller is neither the assignee nor an administrator
    async fn finalize_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
        note: String,
    ) -> Result<WorkOrder, WorkOrderError>;
}

/// Persistence operations for work orders.
#[async_trait]
pub trait WorkOrderRepository: Send + Sync + 'static {
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, work_order: NewWorkOrder) -> Result<WorkOrder, WorkOrderError>;

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &WorkOrderId) -> Result<Option<WorkOrder>, WorkOrderError>;

    /// Assign the work order to `assignee` only if it has no assignee yet.
    ///
    /// # Returns
    /// True if this call claimed it, false if it was already assigned
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn take(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError>;

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(
        &self,
        filter: &WorkOrderFilter,
        page: PageRequest,
    ) -> Result<WorkOrderPage, WorkOrderError>;

    /// Set the assignee and move the work order to `In Progress` unless it
    /// is completed.
    ///
    /// # Returns
    /// False if the work order was completed
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn assign(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError>;

    /// Mark an `In Progress` work order completed by `completed_by`.
    ///
    /// # Returns
    /// False if the work order was not in progress
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn finalize(
        &self,
        id: &WorkOrderId,
        completed_by: &UserId,
        note: &str,
    ) -> Result<bool, WorkOrderError>;
}
