//! ローカル診断出力
//!
//! フックが出力するトレース行の受け口。インターセプター構築時に注入する。

use oplog_common::types::HandlerId;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// フックの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// 前処理
    Before,
    /// 実行時間計測
    Around,
    /// 後処理（成功監査）
    After,
    /// 正常リターン後
    AfterReturning,
    /// 例外送出後（失敗監査）
    AfterThrowing,
}

impl Hook {
    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Around => "around",
            Self::After => "after",
            Self::AfterReturning => "after_returning",
            Self::AfterThrowing => "after_throwing",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// 情報
    Info,
    /// エラー
    Error,
}

/// aroundフックの計測行を組み立てる
pub fn format_timing(handler: &HandlerId, elapsed: Duration, failure: Option<&str>) -> String {
    match failure {
        None => format!("around {}\tUse time : {} ms!", handler, elapsed.as_millis()),
        Some(message) => format!(
            "around {}\tUse time : {} ms with exception: {}",
            handler,
            elapsed.as_millis(),
            message
        ),
    }
}

/// レベル付きの診断出力先
pub trait DiagnosticSink: Send + Sync {
    /// 情報レベルの行を出力
    fn info(&self, hook: Hook, message: &str);

    /// エラーレベルの行を出力
    fn error(&self, hook: Hook, message: &str);

    /// aroundフックの計測結果を出力
    fn timing(&self, handler: &HandlerId, elapsed: Duration, failure: Option<&str>) {
        self.info(Hook::Around, &format_timing(handler, elapsed, failure));
    }
}

/// tracing経由で出力する標準実装
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn info(&self, hook: Hook, message: &str) {
        tracing::info!(target: "oplog::audit", hook = %hook, "{}", message);
    }

    fn error(&self, hook: Hook, message: &str) {
        tracing::error!(target: "oplog::audit", hook = %hook, "{}", message);
    }
}

/// 記録された1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLine {
    /// レベル
    pub level: Level,
    /// 出力元フック
    pub hook: Hook,
    /// 本文
    pub message: String,
    /// aroundフックの計測値
    pub elapsed: Option<Duration>,
}

/// 出力をメモリに溜める実装（検証・組み込み用）
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    lines: Mutex<Vec<DiagnosticLine>>,
}

impl RecordingDiagnostics {
    /// 空のレコーダーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの全行
    pub fn lines(&self) -> Vec<DiagnosticLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// 指定フックの行
    pub fn lines_for(&self, hook: Hook) -> Vec<DiagnosticLine> {
        self.lines()
            .into_iter()
            .filter(|line| line.hook == hook)
            .collect()
    }

    /// 出力されたフックの順序
    pub fn hooks(&self) -> Vec<Hook> {
        self.lines().into_iter().map(|line| line.hook).collect()
    }

    fn push(&self, line: DiagnosticLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn info(&self, hook: Hook, message: &str) {
        self.push(DiagnosticLine {
            level: Level::Info,
            hook,
            message: message.to_string(),
            elapsed: None,
        });
    }

    fn error(&self, hook: Hook, message: &str) {
        self.push(DiagnosticLine {
            level: Level::Error,
            hook,
            message: message.to_string(),
            elapsed: None,
        });
    }

    fn timing(&self, handler: &HandlerId, elapsed: Duration, failure: Option<&str>) {
        self.push(DiagnosticLine {
            level: Level::Info,
            hook: Hook::Around,
            message: format_timing(handler, elapsed, failure),
            elapsed: Some(elapsed),
        });
    }
}
