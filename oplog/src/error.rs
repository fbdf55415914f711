//! エラー型定義
//!
//! 監査インターセプター層の統一エラー型（thiserror使用）

use oplog_common::error::CommonError;
use thiserror::Error;

/// 監査処理のエラー型
#[derive(Debug, Error)]
pub enum AuditError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// ハンドラーに操作メタデータが登録されていない
    #[error("Operation metadata missing for handler: {0}")]
    MissingOperationMetadata(String),

    /// 同一ルートの二重登録
    #[error("Route already registered: {0}")]
    DuplicateRoute(String),

    /// 同一ハンドラーが異なる定義で登録された
    #[error("Handler registered with a conflicting spec: {0}")]
    ConflictingHandler(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// サーバーのバインド・待ち受けエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 監査処理の結果型
pub type AuditResult<T> = Result<T, AuditError>;

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        AuditError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metadata_message() {
        let err = AuditError::MissingOperationMetadata(
            "oplog.controller.UserController.listUsers".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Operation metadata missing for handler: oplog.controller.UserController.listUsers"
        );
    }

    #[test]
    fn test_common_error_is_transparent() {
        let err: AuditError = CommonError::Validation("bad record".to_string()).into();
        assert_eq!(err.to_string(), "Validation error: bad record");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: AuditError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AuditError::Database(_)));
    }
}
