use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;
use crate::domain::work_order::errors::PriorityError;
use crate::domain::work_order::errors::StatusError;

/// Helpdesk ticket raised by one unit for another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    /// Unit expected to handle the ticket
    pub unit: String,
    pub requester_id: UserId,
    pub assignee_id: Option<UserId>,
    pub taken_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<UserId>,
    pub completion_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkOrderId(pub i64);

impl fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            other => Err(PriorityError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkOrderStatus {
    Pending,
    InProgress,
    Completed,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Pending => "Pending",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::Completed => "Completed",
        }
    }
}

impl FromStr for WorkOrderStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(WorkOrderStatus::Pending),
            "In Progress" => Ok(WorkOrderStatus::InProgress),
            "Completed" => Ok(WorkOrderStatus::Completed),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work order creation request as received from a caller.
#[derive(Debug, Clone)]
pub struct CreateWorkOrderCommand {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub unit: String,
}

/// Validated work order ready to persist; always starts `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkOrder {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub unit: String,
    pub requester_id: UserId,
}

/// Status selection for work order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Any,
    /// Everything not yet completed
    Active,
    Only(WorkOrderStatus),
}

impl StatusFilter {
    /// Statuses to match, or `None` for no restriction.
    pub fn statuses(&self) -> Option<Vec<WorkOrderStatus>> {
        match self {
            StatusFilter::Any => None,
            StatusFilter::Active => Some(vec![WorkOrderStatus::Pending, WorkOrderStatus::InProgress]),
            StatusFilter::Only(status) => Some(vec![*status]),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StatusFilter::Active),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Criteria for listing work orders; empty fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub status: StatusFilter,
    /// Handling unit
    pub unit: Option<String>,
    /// Unit of the user who raised the order
    pub requester_unit: Option<String>,
    /// Only orders created on the current calendar day
    pub created_today: bool,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page position, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of work orders, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderPage {
    pub items: Vec<WorkOrder>,
    pub page: PageRequest,
    pub total_items: i64,
}

impl WorkOrderPage {
    pub fn total_pages(&self) -> i64 {
        let limit = i64::from(self.page.limit());
        (self.total_items + limit - 1) / limit
    }
}
