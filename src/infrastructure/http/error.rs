//! HTTP Error Handling
//!
//! 业务错误一律返回 HTTP 200，由 `errno` 区分

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, RepositoryError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    /// 缺少作品/会话上下文，前端应回到作品列表
    pub const MISSING_CONTEXT: i32 = 412;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INTERNAL_ERROR: i32 = 500;
    /// 存储不可用或写入失败
    pub const STORAGE_ERROR: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    MissingContext(String),
    Conflict(String),
    Storage(String),
    Internal(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::MissingContext(_) => errno::MISSING_CONTEXT,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::Storage(_) => errno::STORAGE_ERROR,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::MissingContext(msg)
            | ApiError::Conflict(msg)
            | ApiError::Storage(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message().to_string();

        match &self {
            ApiError::Storage(_) | ApiError::Internal(_) => {
                tracing::error!(errno = errno, error = %msg, "Request failed");
            }
            _ => {
                tracing::warn!(errno = errno, error = %msg, "Request rejected");
            }
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(msg) => ApiError::NotFound(msg),
            RepositoryError::Duplicate(msg) => ApiError::Conflict(msg),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::InvalidState(msg) => ApiError::BadRequest(msg),
            ApplicationError::MissingContext(msg) => ApiError::MissingContext(msg),
            ApplicationError::StorageError(msg) => ApiError::Storage(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_application_error_mapping() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(ApplicationError::not_found("Chapter", id)).errno(),
            errno::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ApplicationError::validation("empty")).errno(),
            errno::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ApplicationError::missing_context("No story selected")).errno(),
            errno::MISSING_CONTEXT
        );
        assert_eq!(
            ApiError::from(ApplicationError::StorageError("disk full".into())).errno(),
            errno::STORAGE_ERROR
        );
    }

    #[test]
    fn test_business_errors_use_http_ok() {
        let response = ApiError::BadRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
