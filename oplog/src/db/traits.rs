//! Repository traitパターン定義
//!
//! 監査ログの永続化を抽象化し、インターセプターをストレージ実装から切り離す。

use async_trait::async_trait;
use oplog_common::types::LogRecord;

use crate::error::AuditError;

/// 監査ログ永続化コラボレーター
///
/// 並行書き込みの安全性は実装側の責務とする。
#[async_trait]
pub trait LogRecordSink: Send + Sync {
    /// レコードを1件挿入し、割り当てられたIDを返す
    async fn insert(&self, record: &LogRecord) -> Result<i64, AuditError>;
}
