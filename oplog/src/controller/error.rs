//! コントローラーのエラー型
//!
//! レスポンスに `HandlerFailure` extensionを付け、監査ミドルウェアに失敗を伝える。

use crate::interceptor::AuditedError;
use crate::service::UserServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use oplog_common::types::HandlerFailure;
use serde_json::json;
use thiserror::Error;

/// コントローラーのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// 引数が不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 同名のユーザーが既に存在する
    #[error("User already exists: {0}")]
    UserExists(String),
}

impl ControllerError {
    fn variant_name(&self) -> &'static str {
        match self {
            ControllerError::InvalidArgument(_) => "InvalidArgument",
            ControllerError::UserExists(_) => "UserExists",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ControllerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ControllerError::UserExists(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<UserServiceError> for ControllerError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::InvalidArgument(msg) => ControllerError::InvalidArgument(msg),
            UserServiceError::UserExists(name) => ControllerError::UserExists(name),
        }
    }
}

impl AuditedError for ControllerError {
    fn error_code(&self) -> String {
        format!(
            "{}::{}",
            std::any::type_name::<Self>(),
            self.variant_name()
        )
    }
}

impl IntoResponse for ControllerError {
    fn into_response(self) -> Response {
        let failure = HandlerFailure {
            code: self.error_code(),
            message: self.to_string(),
        };
        let payload = json!({
            "error": failure.message
        });

        let mut response = (self.status(), Json(payload)).into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_includes_variant() {
        let err = ControllerError::UserExists("alice".to_string());
        assert_eq!(
            err.error_code(),
            "oplog::controller::error::ControllerError::UserExists"
        );
    }

    #[test]
    fn test_from_service_error() {
        assert_eq!(
            ControllerError::from(UserServiceError::InvalidArgument("x".to_string())),
            ControllerError::InvalidArgument("x".to_string())
        );
    }

    #[test]
    fn test_into_response_attaches_failure() {
        let response = ControllerError::UserExists("alice".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let failure = response.extensions().get::<HandlerFailure>().unwrap();
        assert_eq!(failure.message, "User already exists: alice");
        assert!(failure.code.ends_with("ControllerError::UserExists"));
    }
}
