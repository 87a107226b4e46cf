use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::session::models::Principal;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserRepository;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::domain::user::models::UserId;
use crate::domain::work_order::models::NewWorkOrder;
use crate::domain::work_order::models::PageRequest;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderId;
use crate::domain::work_order::models::WorkOrderPage;
use crate::domain::work_order::models::WorkOrderStatus;
use crate::domain::work_order::ports::WorkOrderRepository;
use crate::domain::work_order::ports::WorkOrderServicePort;

/// Domain service implementation for work order operations.
pub struct WorkOrderService<WR, UR>
where
    WR: WorkOrderRepository,
    UR: UserRepository,
{
    repository: Arc<WR>,
    users: Arc<UR>,
}

impl<WR, UR> WorkOrderService<WR, UR>
where
    WR: WorkOrderRepository,
    UR: UserRepository,
{
    /// Create a new work order service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Work order persistence implementation
    /// * `users` - Lookup for the caller's unit
    pub fn new(repository: Arc<WR>, users: Arc<UR>) -> Self {
        Self { repository, users }
    }

    /// The caller's unit is not in the token, so it is read from the directory.
    async fn load_actor(&self, actor: &Principal) -> Result<User, WorkOrderError> {
        self.users
            .find_by_id(&actor.user_id)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?
            .ok_or_else(|| WorkOrderError::Forbidden("unknown user".to_string()))
    }

    async fn find(&self, id: &WorkOrderId) -> Result<WorkOrder, WorkOrderError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(WorkOrderError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<WR, UR> WorkOrderServicePort for WorkOrderService<WR, UR>
where
    WR: WorkOrderRepository,
    UR: UserRepository,
{
    async fn create_work_order(
        &self,
        actor: &Principal,
        command: CreateWorkOrderCommand,
    ) -> Result<WorkOrder, WorkOrderError> {
        if !actor.may_write() {
            return Err(WorkOrderError::Forbidden(
                "write permission required".to_string(),
            ));
        }

        let title = command.title.trim();
        if title.is_empty() {
            return Err(WorkOrderError::Validation("title is required".to_string()));
        }

        let unit = command.unit.trim();
        if unit.is_empty() {
            return Err(WorkOrderError::Validation(
                "target unit is required".to_string(),
            ));
        }

        let requester = self.load_actor(actor).await?;
        if requester.unit == unit {
            return Err(WorkOrderError::Validation(
                "cannot raise a work order for your own unit".to_string(),
            ));
        }

        let work_order = self
            .repository
            .create(NewWorkOrder {
                title: title.to_string(),
                description: command.description,
                priority: command.priority,
                unit: unit.to_string(),
                requester_id: requester.id,
            })
            .await?;

        tracing::info!(
            work_order_id = %work_order.id,
            requester_id = %requester.id,
            unit = %work_order.unit,
            "Work order created"
        );

        Ok(work_order)
    }

    async fn get_work_order(&self, id: &WorkOrderId) -> Result<WorkOrder, WorkOrderError> {
        self.find(id).await
    }

    async fn take_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
    ) -> Result<WorkOrder, WorkOrderError> {
        let work_order = self.find(id).await?;
        let assignee = self.load_actor(actor).await?;

        if work_order.unit != assignee.unit {
            return Err(WorkOrderError::Forbidden(
                "work order belongs to another unit".to_string(),
            ));
        }

        if work_order.status == WorkOrderStatus::Completed {
            return Err(WorkOrderError::AlreadyCompleted);
        }

        if !self.repository.take(id, &assignee.id).await? {
            return Err(WorkOrderError::AlreadyTaken);
        }

        tracing::info!(work_order_id = %id, assignee_id = %assignee.id, "Work order taken");

        self.find(id).await
    }

    async fn list_work_orders(
        &self,
        filter: WorkOrderFilter,
        page: PageRequest,
    ) -> Result<WorkOrderPage, WorkOrderError> {
        self.repository.list(&filter, page).await
    }

    async fn assign_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
        assignee: &UserId,
    ) -> Result<WorkOrder, WorkOrderError> {
        if !actor.is_admin() {
            return Err(WorkOrderError::Forbidden(
                "only administrators assign work orders".to_string(),
            ));
        }

        let assignee = self
            .users
            .find_by_id(assignee)
            .await
            .map_err(|e| WorkOrderError::DatabaseError(e.to_string()))?
            .ok_or_else(|| WorkOrderError::AssigneeNotFound(assignee.to_string()))?;

        let work_order = self.find(id).await?;
        if work_order.status == WorkOrderStatus::Completed {
            return Err(WorkOrderError::AlreadyCompleted);
        }

        // Completion may land between the read and the update.
        if !self.repository.assign(id, &assignee.id).await? {
            return Err(WorkOrderError::AlreadyCompleted);
        }

        tracing::info!(
            work_order_id = %id,
            assignee_id = %assignee.id,
            admin_id = %actor.user_id,
            "Work order assigned"
        );

        self.find(id).await
    }

    async fn finalize_work_order(
        &self,
        actor: &Principal,
        id: &WorkOrderId,
        note: String,
    ) -> Result<WorkOrder, WorkOrderError> {
        let work_order = self.find(id).await?;

        if work_order.status == WorkOrderStatus::Completed {
            return Err(WorkOrderError::AlreadyCompleted);
        }

        let Some(assignee) = work_order.assignee_id else {
            return Err(WorkOrderError::NotTaken);
        };

        if assignee != actor.user_id && !actor.is_admin() {
            return Err(WorkOrderError::Forbidden(
                "only the assignee may finalize this work order".to_string(),
            ));
        }

        if !self
            .repository
            .finalize(id, &actor.user_id, note.trim())
            .await?
        {
            return Err(WorkOrderError::AlreadyCompleted);
        }

        tracing::info!(work_order_id = %id, completed_by = %actor.user_id, "Work order completed");

        self.find(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::errors::UserError;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::NewUser;
    use crate::domain::user::models::Role;
    use crate::domain::user::models::UserId;
    use crate::domain::work_order::models::Priority;
    use crate::domain::work_order::models::StatusFilter;

    mock! {
        pub TestWorkOrderRepository {}

        #[async_trait]
        impl WorkOrderRepository for TestWorkOrderRepository {
            async fn create(&self, work_order: NewWorkOrder) -> Result<WorkOrder, WorkOrderError>;
            async fn find_by_id(&self, id: &WorkOrderId) -> Result<Option<WorkOrder>, WorkOrderError>;
            async fn take(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError>;
            async fn list(&self, filter: &WorkOrderFilter, page: PageRequest) -> Result<WorkOrderPage, WorkOrderError>;
            async fn assign(&self, id: &WorkOrderId, assignee: &UserId) -> Result<bool, WorkOrderError>;
            async fn finalize(&self, id: &WorkOrderId, completed_by: &UserId, note: &str) -> Result<bool, WorkOrderError>;
        }
    }

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
        }
    }

    fn user(id: i64, unit: &str, role: Role, can_write: bool) -> User {
        User {
            id: UserId(id),
            name: format!("user{}", id),
            email: EmailAddress::new(format!("user{}@example.com", id)).unwrap(),
            role,
            unit: unit.to_string(),
            can_write,
            password_hash: "$argon2id$test_hash".to_string(),
            created_at: Utc::now(),
        }
    }

    fn principal(user: &User) -> Principal {
        Principal {
            user_id: user.id,
            role: user.role,
            can_write: user.can_write,
        }
    }

    fn work_order(id: i64, unit: &str, status: WorkOrderStatus) -> WorkOrder {
        WorkOrder {
            id: WorkOrderId(id),
            title: "Printer jammed".to_string(),
            description: String::new(),
            priority: Priority::Medium,
            status,
            unit: unit.to_string(),
            requester_id: UserId(1),
            assignee_id: None,
            taken_at: None,
            completed_at: None,
            completed_by: None,
            completion_note: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn command(unit: &str) -> CreateWorkOrderCommand {
        CreateWorkOrderCommand {
            title: "Printer jammed".to_string(),
            description: "Third floor".to_string(),
            priority: Priority::High,
            unit: unit.to_string(),
        }
    }

    fn users_returning(user: User) -> MockTestUserRepository {
        let mut users = MockTestUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users
    }

    #[tokio::test]
    async fn test_create_work_order_success() {
        let requester = user(1, "Finance", Role::Staff, true);
        let mut repository = MockTestWorkOrderRepository::new();

        repository
            .expect_create()
            .withf(|new| new.unit == "IT" && new.requester_id == UserId(1))
            .times(1)
            .returning(|new| {
                let mut created = work_order(10, &new.unit, WorkOrderStatus::Pending);
                created.requester_id = new.requester_id;
                Ok(created)
            });

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(users_returning(requester.clone())));

        let created = service
            .create_work_order(&principal(&requester), command(" IT "))
            .await
            .unwrap();

        assert_eq!(created.id, WorkOrderId(10));
        assert_eq!(created.status, WorkOrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_work_order_requires_write_permission() {
        let requester = user(1, "Finance", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_create().times(0);

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(users_returning(requester.clone())));

        let err = service
            .create_work_order(&principal(&requester), command("IT"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_may_create_without_grant() {
        let admin = user(1, "Management", Role::Admin, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_create()
            .times(1)
            .returning(|new| Ok(work_order(11, &new.unit, WorkOrderStatus::Pending)));

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(users_returning(admin.clone())));

        let result = service
            .create_work_order(&principal(&admin), command("IT"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_work_order_for_own_unit() {
        let requester = user(1, "IT", Role::Staff, true);
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_create().times(0);

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(users_returning(requester.clone())));

        let err = service
            .create_work_order(&principal(&requester), command("IT"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_work_order_without_unit() {
        let requester = user(1, "Finance", Role::Staff, true);
        let repository = MockTestWorkOrderRepository::new();

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(users_returning(requester.clone())));

        let err = service
            .create_work_order(&principal(&requester), command("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Validation(_)));
    }

    #[tokio::test]
    async fn test_take_work_order_success() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();

        let mut calls = 0;
        repository
            .expect_find_by_id()
            .times(2)
            .returning(move |id| {
                calls += 1;
                let mut found = work_order(id.0, "IT", WorkOrderStatus::Pending);
                if calls > 1 {
                    found.status = WorkOrderStatus::InProgress;
                    found.assignee_id = Some(UserId(2));
                }
                Ok(Some(found))
            });
        repository
            .expect_take()
            .withf(|id, assignee| *id == WorkOrderId(5) && *assignee == UserId(2))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let taken = service
            .take_work_order(&principal(&technician), &WorkOrderId(5))
            .await
            .unwrap();

        assert_eq!(taken.status, WorkOrderStatus::InProgress);
        assert_eq!(taken.assignee_id, Some(UserId(2)));
    }

    #[tokio::test]
    async fn test_take_missing_work_order() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository.expect_take().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let err = service
            .take_work_order(&principal(&technician), &WorkOrderId(5))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_take_work_order_of_other_unit() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(work_order(id.0, "Facilities", WorkOrderStatus::Pending))));
        repository.expect_take().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let err = service
            .take_work_order(&principal(&technician), &WorkOrderId(5))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_take_completed_work_order() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(work_order(id.0, "IT", WorkOrderStatus::Completed))));
        repository.expect_take().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let err = service
            .take_work_order(&principal(&technician), &WorkOrderId(5))
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AlreadyCompleted);
    }

    #[tokio::test]
    async fn test_take_already_claimed_work_order() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(work_order(id.0, "IT", WorkOrderStatus::InProgress))));
        repository
            .expect_take()
            .times(1)
            .returning(|_, _| Ok(false));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let err = service
            .take_work_order(&principal(&technician), &WorkOrderId(5))
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AlreadyTaken);
    }

    fn in_progress(id: i64, unit: &str, assignee: i64) -> WorkOrder {
        let mut found = work_order(id, unit, WorkOrderStatus::InProgress);
        found.assignee_id = Some(UserId(assignee));
        found
    }

    #[tokio::test]
    async fn test_list_work_orders_passes_filter_through() {
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_list()
            .withf(|filter, page| {
                filter.status == StatusFilter::Active
                    && filter.unit.as_deref() == Some("IT")
                    && page.page() == 2
            })
            .times(1)
            .returning(|_, page| {
                Ok(WorkOrderPage {
                    items: vec![work_order(1, "IT", WorkOrderStatus::Pending)],
                    page,
                    total_items: 11,
                })
            });

        let service =
            WorkOrderService::new(Arc::new(repository), Arc::new(MockTestUserRepository::new()));

        let filter = WorkOrderFilter {
            status: StatusFilter::Active,
            unit: Some("IT".to_string()),
            ..WorkOrderFilter::default()
        };
        let page = service
            .list_work_orders(filter, PageRequest::new(Some(2), Some(10)))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_assign_work_order_success() {
        let admin = user(1, "Management", Role::Admin, false);
        let technician = user(3, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();

        let mut calls = 0;
        repository.expect_find_by_id().times(2).returning(move |id| {
            calls += 1;
            Ok(Some(if calls > 1 {
                in_progress(id.0, "IT", 3)
            } else {
                work_order(id.0, "IT", WorkOrderStatus::Pending)
            }))
        });
        repository
            .expect_assign()
            .withf(|id, assignee| *id == WorkOrderId(5) && *assignee == UserId(3))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let assigned = service
            .assign_work_order(&principal(&admin), &WorkOrderId(5), &technician.id)
            .await
            .unwrap();

        assert_eq!(assigned.assignee_id, Some(UserId(3)));
        assert_eq!(assigned.status, WorkOrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_assign_work_order_requires_admin() {
        let staff = user(2, "IT", Role::Staff, true);
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_assign().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let err = service
            .assign_work_order(&principal(&staff), &WorkOrderId(5), &UserId(3))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_assign_work_order_to_unknown_user() {
        let admin = user(1, "Management", Role::Admin, false);
        let mut users = MockTestUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_assign().times(0);

        let service = WorkOrderService::new(Arc::new(repository), Arc::new(users));

        let err = service
            .assign_work_order(&principal(&admin), &WorkOrderId(5), &UserId(99))
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AssigneeNotFound("99".to_string()));
    }

    #[tokio::test]
    async fn test_assign_completed_work_order() {
        let admin = user(1, "Management", Role::Admin, false);
        let technician = user(3, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(work_order(id.0, "IT", WorkOrderStatus::Completed))));
        repository.expect_assign().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(users_returning(technician.clone())),
        );

        let err = service
            .assign_work_order(&principal(&admin), &WorkOrderId(5), &technician.id)
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AlreadyCompleted);
    }

    #[tokio::test]
    async fn test_finalize_by_assignee() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();

        let mut calls = 0;
        repository.expect_find_by_id().times(2).returning(move |id| {
            calls += 1;
            let mut found = in_progress(id.0, "IT", 2);
            if calls > 1 {
                found.status = WorkOrderStatus::Completed;
                found.completed_by = Some(UserId(2));
                found.completion_note = "Replaced the fuser".to_string();
            }
            Ok(Some(found))
        });
        repository
            .expect_finalize()
            .withf(|id, by, note| {
                *id == WorkOrderId(5) && *by == UserId(2) && note == "Replaced the fuser"
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let done = service
            .finalize_work_order(
                &principal(&technician),
                &WorkOrderId(5),
                "  Replaced the fuser ".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(done.status, WorkOrderStatus::Completed);
        assert_eq!(done.completed_by, Some(UserId(2)));
    }

    #[tokio::test]
    async fn test_finalize_by_other_staff_is_forbidden() {
        let colleague = user(4, "IT", Role::Staff, true);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(in_progress(id.0, "IT", 2))));
        repository.expect_finalize().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let err = service
            .finalize_work_order(&principal(&colleague), &WorkOrderId(5), String::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkOrderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_admin_may_finalize_for_assignee() {
        let admin = user(1, "Management", Role::Admin, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(in_progress(id.0, "IT", 2))));
        repository
            .expect_finalize()
            .withf(|_, by, _| *by == UserId(1))
            .times(1)
            .returning(|_, _, _| Ok(true));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let result = service
            .finalize_work_order(&principal(&admin), &WorkOrderId(5), String::new())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_finalize_untaken_work_order() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Ok(Some(work_order(id.0, "IT", WorkOrderStatus::Pending))));
        repository.expect_finalize().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let err = service
            .finalize_work_order(&principal(&technician), &WorkOrderId(5), String::new())
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::NotTaken);
    }

    #[tokio::test]
    async fn test_finalize_twice() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository.expect_find_by_id().returning(|id| {
            let mut found = in_progress(id.0, "IT", 2);
            found.status = WorkOrderStatus::Completed;
            Ok(Some(found))
        });
        repository.expect_finalize().times(0);

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let err = service
            .finalize_work_order(&principal(&technician), &WorkOrderId(5), String::new())
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AlreadyCompleted);
    }

    #[tokio::test]
    async fn test_finalize_loses_race_with_completion() {
        let technician = user(2, "IT", Role::Staff, false);
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(in_progress(id.0, "IT", 2))));
        repository
            .expect_finalize()
            .times(1)
            .returning(|_, _, _| Ok(false));

        let service = WorkOrderService::new(
            Arc::new(repository),
            Arc::new(MockTestUserRepository::new()),
        );

        let err = service
            .finalize_work_order(&principal(&technician), &WorkOrderId(5), String::new())
            .await
            .unwrap_err();

        assert_eq!(err, WorkOrderError::AlreadyCompleted);
    }
}
