//! 監査ログの型定義
//!
//! ハンドラー識別子・操作メタデータ・呼び出し元・永続化レコード

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ハンドラーの完全修飾識別子
///
/// `target` はドット区切りの名前空間付き型名、`method` はハンドラー名。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId {
    /// 名前空間付きの型名（例: `com.nice.controller.UserController`）
    pub target: String,
    /// メソッド名（例: `testAOP`）
    pub method: String,
}

impl HandlerId {
    /// 新しいHandlerIdを作成
    pub fn new(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
        }
    }

    /// `<target>.<method>()` 形式のシグネチャ文字列
    pub fn signature(&self) -> String {
        format!("{}.{}()", self.target, self.method)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.method)
    }
}

/// ハンドラーに付与される操作メタデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// 操作種別（カテゴリラベル）
    pub operation_type: String,
    /// 操作名（人間向けの説明）
    pub operation_name: String,
}

impl OperationMetadata {
    /// 新しいOperationMetadataを作成
    pub fn new(operation_type: impl Into<String>, operation_name: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            operation_name: operation_name.into(),
        }
    }
}

/// 呼び出し元（リクエストextensionで受け渡す）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// 数値ID
    pub id: i64,
    /// 表示名
    pub name: String,
}

impl Actor {
    /// 新しいActorを作成
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// ハンドラーが失敗したことを示す情報（ハンドラーからミドルウェアへの受け渡し用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// エラーコード（エラー型名）
    pub code: String,
    /// エラーメッセージ
    pub message: String,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// ログ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum LogType {
    /// 正常終了
    Success,
    /// 例外発生
    Exception,
}

impl LogType {
    /// DB格納用の数値表現
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::Exception => 1,
        }
    }
}

impl From<LogType> for i64 {
    fn from(value: LogType) -> Self {
        value.as_i64()
    }
}

impl TryFrom<i64> for LogType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Exception),
            other => Err(format!("unknown log type: {}", other)),
        }
    }
}

/// 永続化される監査ログレコード
///
/// `success` / `failure` のいずれかで生成する。例外フィールドは
/// `log_type == Exception` のときだけ埋まる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// レコードID（DB挿入後に設定）
    pub id: Option<i64>,
    /// 操作名
    pub description: String,
    /// 呼び出されたメソッドのシグネチャ
    pub method: String,
    /// ログ種別
    pub log_type: LogType,
    /// リクエスト元IP
    pub request_ip: String,
    /// 例外コード
    pub exception_code: Option<String>,
    /// 例外メッセージ
    pub exception_detail: Option<String>,
    /// シリアライズ済み引数
    pub params: Option<String>,
    /// 実行ユーザー名
    pub create_by: String,
    /// 作成日時
    pub create_date: DateTime<Utc>,
}

impl LogRecord {
    /// 正常終了レコードを作成
    pub fn success(
        description: impl Into<String>,
        method: impl Into<String>,
        create_by: impl Into<String>,
        request_ip: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            description: description.into(),
            method: method.into(),
            log_type: LogType::Success,
            request_ip: request_ip.into(),
            exception_code: None,
            exception_detail: None,
            params: None,
            create_by: create_by.into(),
            create_date: Utc::now(),
        }
    }

    /// 例外レコードを作成
    pub fn failure(
        description: impl Into<String>,
        method: impl Into<String>,
        failure: &HandlerFailure,
        params: impl Into<String>,
        create_by: impl Into<String>,
        request_ip: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            description: description.into(),
            method: method.into(),
            log_type: LogType::Exception,
            request_ip: request_ip.into(),
            exception_code: Some(failure.code.clone()),
            exception_detail: Some(failure.message.clone()),
            params: Some(params.into()),
            create_by: create_by.into(),
            create_date: Utc::now(),
        }
    }

    /// 例外フィールドとログ種別が整合しているか
    pub fn is_consistent(&self) -> bool {
        match self.log_type {
            LogType::Success => {
                self.exception_code.is_none()
                    && self.exception_detail.is_none()
                    && self.params.is_none()
            }
            LogType::Exception => self.exception_code.is_some() && self.exception_detail.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> HandlerFailure {
        HandlerFailure {
            code: "oplog::UserError".to_string(),
            message: "duplicate user".to_string(),
        }
    }

    #[test]
    fn test_handler_signature() {
        let id = HandlerId::new("com.nice.controller.UserController", "testAOP");
        assert_eq!(id.signature(), "com.nice.controller.UserController.testAOP()");
        assert_eq!(id.to_string(), "com.nice.controller.UserController.testAOP");
    }

    #[test]
    fn test_log_type_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&LogType::Success).unwrap(), "0");
        assert_eq!(serde_json::to_string(&LogType::Exception).unwrap(), "1");
        let parsed: LogType = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, LogType::Exception);
        assert!(serde_json::from_str::<LogType>("2").is_err());
    }

    #[test]
    fn test_success_record_has_no_exception_fields() {
        let record = LogRecord::success("添加用户", "a.B.c().add", "nice", "127.0.0.1");
        assert_eq!(record.log_type, LogType::Success);
        assert!(record.exception_code.is_none());
        assert!(record.exception_detail.is_none());
        assert!(record.params.is_none());
        assert!(record.id.is_none());
        assert!(record.is_consistent());
    }

    #[test]
    fn test_failure_record_carries_exception_fields() {
        let record = LogRecord::failure(
            "添加用户",
            "a.B.c()",
            &failure(),
            "\"x\";",
            "nice",
            "10.0.0.1",
        );
        assert_eq!(record.log_type, LogType::Exception);
        assert_eq!(record.exception_code.as_deref(), Some("oplog::UserError"));
        assert_eq!(record.exception_detail.as_deref(), Some("duplicate user"));
        assert_eq!(record.params.as_deref(), Some("\"x\";"));
        assert!(record.is_consistent());
    }

    #[test]
    fn test_inconsistent_record_detected() {
        let mut record = LogRecord::success("d", "m", "nice", "127.0.0.1");
        record.exception_code = Some("Boom".to_string());
        assert!(!record.is_consistent());

        let mut record = LogRecord::failure("d", "m", &failure(), "", "nice", "127.0.0.1");
        record.exception_detail = None;
        assert!(!record.is_consistent());
    }

    #[test]
    fn test_record_serialization() {
        let record = LogRecord::success("添加用户", "a.B.c().add", "nice", "127.0.0.1");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"log_type\":0"));
        assert!(json.contains("\"create_by\":\"nice\""));
    }
}
