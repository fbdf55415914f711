//! 監査ログ一覧API
//!
//! `/api/system-logs` はコントローラー名前空間の外にあり、監査対象にならない。

use super::error::AppError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use oplog_common::error::CommonError;
use oplog_common::types::{LogRecord, LogType};
use serde::{Deserialize, Serialize};

/// デフォルトの取得件数
pub const DEFAULT_LIMIT: i64 = 50;

/// 一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct SystemLogQueryParams {
    /// 取得件数（デフォルト: 50、上限: 500）
    pub limit: Option<i64>,
}

/// 一覧レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct SystemLogListResponse {
    /// 新しい順のログ
    pub items: Vec<LogRecord>,
    /// 成功ログの総数
    pub success_total: i64,
    /// 例外ログの総数
    pub exception_total: i64,
}

/// GET /api/system-logs - 監査ログ一覧取得
pub async fn list_system_logs(
    State(state): State<AppState>,
    Query(params): Query<SystemLogQueryParams>,
) -> Result<Json<SystemLogListResponse>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit < 1 {
        return Err(AppError(
            CommonError::Validation(format!("limit must be positive: {}", limit)).into(),
        ));
    }

    let items = state.system_log.list_recent(limit).await?;
    let success_total = state.system_log.count_by_type(LogType::Success).await?;
    let exception_total = state.system_log.count_by_type(LogType::Exception).await?;

    Ok(Json(SystemLogListResponse {
        items,
        success_total,
        exception_total,
    }))
}
