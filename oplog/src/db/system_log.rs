//! 監査ログストレージ
//!
//! `system_log` テーブルへの挿入と参照

use crate::db::traits::LogRecordSink;
use crate::error::{AuditError, AuditResult};
use async_trait::async_trait;
use oplog_common::error::CommonError;
use oplog_common::types::{LogRecord, LogType};
use sqlx::SqlitePool;

/// 一覧取得時の最大件数
pub const MAX_LIST_LIMIT: i64 = 500;

/// 監査ログのDB操作
#[derive(Clone)]
pub struct SystemLogStorage {
    pool: SqlitePool,
}

/// sqlx::FromRow用の行構造体
#[derive(Debug, sqlx::FromRow)]
struct SystemLogRow {
    id: i64,
    description: String,
    method: String,
    log_type: i64,
    request_ip: String,
    exception_code: Option<String>,
    exception_detail: Option<String>,
    params: Option<String>,
    create_by: String,
    create_date: String,
}

impl TryFrom<SystemLogRow> for LogRecord {
    type Error = AuditError;

    fn try_from(row: SystemLogRow) -> Result<Self, Self::Error> {
        let create_date = chrono::DateTime::parse_from_rfc3339(&row.create_date)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| AuditError::Database(format!("Failed to parse create_date: {}", e)))?;
        let log_type = LogType::try_from(row.log_type).map_err(AuditError::Database)?;

        Ok(LogRecord {
            id: Some(row.id),
            description: row.description,
            method: row.method,
            log_type,
            request_ip: row.request_ip,
            exception_code: row.exception_code,
            exception_detail: row.exception_detail,
            params: row.params,
            create_by: row.create_by,
            create_date,
        })
    }
}

impl SystemLogStorage {
    /// 新しいSystemLogStorageを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 監査ログを1件挿入
    ///
    /// ログ種別と例外フィールドが矛盾するレコードは拒否する。
    pub async fn insert_record(&self, record: &LogRecord) -> AuditResult<i64> {
        if !record.is_consistent() {
            return Err(CommonError::Validation(format!(
                "exception fields do not match log type {} for {}",
                record.log_type.as_i64(),
                record.method
            ))
            .into());
        }

        let result = sqlx::query(
            "INSERT INTO system_log (
                description, method, log_type, request_ip,
                exception_code, exception_detail, params, create_by, create_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.description)
        .bind(&record.method)
        .bind(record.log_type.as_i64())
        .bind(&record.request_ip)
        .bind(&record.exception_code)
        .bind(&record.exception_detail)
        .bind(&record.params)
        .bind(&record.create_by)
        .bind(record.create_date.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Database(format!("Failed to insert system log: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// 新しい順に最大 `limit` 件を取得（上限 [`MAX_LIST_LIMIT`]）
    pub async fn list_recent(&self, limit: i64) -> AuditResult<Vec<LogRecord>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let rows: Vec<SystemLogRow> = sqlx::query_as(
            "SELECT id, description, method, log_type, request_ip,
                    exception_code, exception_detail, params, create_by, create_date
             FROM system_log
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuditError::Database(format!("Failed to query system log: {}", e)))?;

        rows.into_iter().map(LogRecord::try_from).collect()
    }

    /// ログ種別ごとの件数
    pub async fn count_by_type(&self, log_type: LogType) -> AuditResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM system_log WHERE log_type = ?")
            .bind(log_type.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuditError::Database(format!("Failed to count system log: {}", e)))?;
        Ok(count.0)
    }
}

#[async_trait]
impl LogRecordSink for SystemLogStorage {
    async fn insert(&self, record: &LogRecord) -> Result<i64, AuditError> {
        self.insert_record(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db_pool;
    use oplog_common::types::HandlerFailure;

    fn success_record(description: &str) -> LogRecord {
        LogRecord::success(
            description,
            "com.nice.controller.UserController.testAOP().add操作:",
            "nice",
            "127.0.0.1",
        )
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let storage = SystemLogStorage::new(test_db_pool().await);

        let id = storage.insert_record(&success_record("添加用户")).await.unwrap();
        assert!(id > 0);

        let records = storage.list_recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, Some(id));
        assert_eq!(record.description, "添加用户");
        assert_eq!(
            record.method,
            "com.nice.controller.UserController.testAOP().add操作:"
        );
        assert_eq!(record.log_type, LogType::Success);
        assert_eq!(record.create_by, "nice");
        assert!(record.exception_code.is_none());
    }

    #[tokio::test]
    async fn test_failure_record_roundtrips_exception_fields() {
        let storage = SystemLogStorage::new(test_db_pool().await);
        let failure = HandlerFailure {
            code: "UserExists".to_string(),
            message: "user already exists: alice".to_string(),
        };
        let record = LogRecord::failure(
            "添加用户",
            "com.nice.controller.UserController.testAOP()",
            &failure,
            "\"alice\";\"secret\";",
            "nice",
            "10.0.0.1",
        );

        storage.insert_record(&record).await.unwrap();

        let stored = storage.list_recent(1).await.unwrap().remove(0);
        assert_eq!(stored.log_type, LogType::Exception);
        assert_eq!(stored.exception_code.as_deref(), Some("UserExists"));
        assert_eq!(
            stored.exception_detail.as_deref(),
            Some("user already exists: alice")
        );
        assert_eq!(stored.params.as_deref(), Some("\"alice\";\"secret\";"));
        assert_eq!(stored.request_ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_inconsistent_record_rejected() {
        let storage = SystemLogStorage::new(test_db_pool().await);
        let mut record = success_record("broken");
        record.exception_detail = Some("should not be here".to_string());

        let result = storage.insert_record(&record).await;
        assert!(matches!(
            result,
            Err(AuditError::Common(CommonError::Validation(_)))
        ));
        assert_eq!(storage.count_by_type(LogType::Success).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_limited() {
        let storage = SystemLogStorage::new(test_db_pool().await);
        for i in 0..5 {
            storage
                .insert_record(&success_record(&format!("op-{}", i)))
                .await
                .unwrap();
        }

        let records = storage.list_recent(3).await.unwrap();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["op-4", "op-3", "op-2"]);

        // 0以下は1件に丸める
        assert_eq!(storage.list_recent(0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_count_by_type() {
        let storage = SystemLogStorage::new(test_db_pool().await);
        let failure = HandlerFailure {
            code: "Boom".to_string(),
            message: "boom".to_string(),
        };
        storage.insert_record(&success_record("a")).await.unwrap();
        storage.insert_record(&success_record("b")).await.unwrap();
        storage
            .insert_record(&LogRecord::failure("c", "m()", &failure, "", "nice", "127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(storage.count_by_type(LogType::Success).await.unwrap(), 2);
        assert_eq!(storage.count_by_type(LogType::Exception).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sink_trait_delegates_to_storage() {
        let storage = SystemLogStorage::new(test_db_pool().await);
        let sink: &dyn LogRecordSink = &storage;

        sink.insert(&success_record("via trait")).await.unwrap();
        assert_eq!(storage.count_by_type(LogType::Success).await.unwrap(), 1);
    }
}
