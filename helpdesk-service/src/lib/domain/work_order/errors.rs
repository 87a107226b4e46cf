use thiserror::Error;

/// Error for Priority parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriorityError {
    #[error("Unknown priority: {0}")]
    Unknown(String),
}

/// Error for WorkOrderStatus parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown status: {0}")]
    Unknown(String),
}

/// Top-level error for work order operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkOrderError {
    #[error("Invalid priority: {0}")]
    InvalidPriority(#[from] PriorityError),

    #[error("Invalid status: {0}")]
    InvalidStatus(#[from] StatusError),

    #[error("Invalid work order: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Work order not found: {0}")]
    NotFound(String),

    #[error("Work order is already completed")]
    AlreadyCompleted,

    #[error("Work order has already been taken")]
    AlreadyTaken,

    #[error("Work order has not been taken yet")]
    NotTaken,

    #[error("Assignee not found: {0}")]
    AssigneeNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
