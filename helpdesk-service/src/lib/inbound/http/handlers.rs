use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::session::errors::SessionError;
use crate::domain::user::errors::UserError;
use crate::domain::work_order::errors::WorkOrderError;

pub mod assign_work_order;
pub mod create_work_order;
pub mod finalize_work_order;
pub mod get_work_order;
pub mod list_work_orders;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod revoke_session;
pub mod take_work_order;

/// The one message every authentication failure produces.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or expired token";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials => {
                ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            // Details were logged by the service; clients only see the generic message.
            e if e.is_unauthorized() => ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()),
            _ => ApiError::InternalServerError("Internal server error".to_string()),
        }
    }
}

impl From<WorkOrderError> for ApiError {
    fn from(err: WorkOrderError) -> Self {
        match err {
            WorkOrderError::NotFound(_) | WorkOrderError::AssigneeNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            WorkOrderError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            WorkOrderError::Validation(_)
            | WorkOrderError::AlreadyCompleted
            | WorkOrderError::NotTaken => ApiError::BadRequest(err.to_string()),
            WorkOrderError::AlreadyTaken => ApiError::Conflict(err.to_string()),
            WorkOrderError::InvalidPriority(_)
            | WorkOrderError::InvalidStatus(_)
            | WorkOrderError::DatabaseError(_) => {
                tracing::error!(error = %err, "Work order operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            // Invalid emails or roles here come from stored rows, not from the caller.
            UserError::InvalidEmail(_) | UserError::InvalidRole(_) | UserError::DatabaseError(_) => {
                tracing::error!(error = %err, "User lookup failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}
