//! インメモリ監査ログストア
//!
//! DBを持たない組み込み用途・テスト用の `LogRecordSink` 実装

use crate::db::traits::LogRecordSink;
use crate::error::AuditError;
use async_trait::async_trait;
use oplog_common::types::LogRecord;
use tokio::sync::Mutex;

/// 挿入されたレコードを保持するだけのシンク
#[derive(Default)]
pub struct MemoryLogSink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogSink {
    /// 空のシンクを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みレコードのスナップショット
    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.clone()
    }

    /// 保存済みレコード数
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// 1件も保存されていないか
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl LogRecordSink for MemoryLogSink {
    async fn insert(&self, record: &LogRecord) -> Result<i64, AuditError> {
        let mut records = self.records.lock().await;
        let id = records.len() as i64 + 1;
        let mut stored = record.clone();
        stored.id = Some(id);
        records.push(stored);
        Ok(id)
    }
}
