//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::error::AuditError;
use axum::{http::StatusCode, response::IntoResponse, Json};
use oplog_common::error::CommonError;
use serde_json::json;
use tracing::error;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub AuditError);

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self.0 {
            AuditError::Common(CommonError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            _ => {
                error!("API request failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let payload = json!({
            "error": message
        });

        (status, Json(payload)).into_response()
    }
}
