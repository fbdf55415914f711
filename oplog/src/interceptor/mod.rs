//! 監査インターセプター
//!
//! ポイントカットに一致したハンドラー呼び出しを次の順でフックする:
//! `before → around(start) → proceed → around(end) → after → after-returning`。
//! 失敗時の流れは [`FailureMode`] に従う。

/// ポイントカット
pub mod pointcut;

/// 操作メタデータレジストリ
pub mod registry;

/// ローカル診断出力
pub mod diagnostics;

/// 呼び出し元の解決
pub mod actor;

/// axumミドルウェア
pub mod middleware;

use crate::db::traits::LogRecordSink;
use diagnostics::{DiagnosticSink, Hook, TracingDiagnostics};
use oplog_common::config::{AuditConfig, FailureMode};
use oplog_common::types::{Actor, HandlerFailure, HandlerId, LogRecord};
use pointcut::Pointcut;
use registry::OperationRegistry;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// 監査対象ハンドラーが返すエラー
///
/// `error_code` は例外コード列に、`Display` は例外メッセージ列に記録される。
pub trait AuditedError: fmt::Display {
    /// エラーコード（デフォルトは型名）
    fn error_code(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl AuditedError for HandlerFailure {
    fn error_code(&self) -> String {
        self.code.clone()
    }
}

/// インターセプトされた1回の呼び出し
#[derive(Debug, Clone)]
pub struct Invocation {
    /// 呼び出されたハンドラー
    pub handler: HandlerId,
    /// 宣言順の引数
    pub args: Vec<serde_json::Value>,
    /// 呼び出し元
    pub actor: Actor,
    /// リクエスト元IP
    pub origin: String,
}

/// 引数をJSON化し、各要素の後ろに区切り文字を付けて連結する
pub fn serialize_args(args: &[serde_json::Value], separator: &str) -> String {
    args.iter().fold(String::new(), |mut acc, arg| {
        acc.push_str(&arg.to_string());
        acc.push_str(separator);
        acc
    })
}

/// 監査インターセプター
pub struct AuditInterceptor {
    pointcut: Pointcut,
    registry: Arc<OperationRegistry>,
    sink: Arc<dyn LogRecordSink>,
    diagnostics: Arc<dyn DiagnosticSink>,
    config: AuditConfig,
}

impl AuditInterceptor {
    /// 設定・レジストリ・永続化先からインターセプターを作成
    ///
    /// 診断出力はtracingに流れる。差し替えは [`Self::with_diagnostics`]。
    pub fn new(
        config: AuditConfig,
        registry: OperationRegistry,
        sink: Arc<dyn LogRecordSink>,
    ) -> Self {
        Self {
            pointcut: Pointcut::namespace(config.controller_namespace.clone()),
            registry: Arc::new(registry),
            sink,
            diagnostics: Arc::new(TracingDiagnostics),
            config,
        }
    }

    /// 診断出力先を差し替える
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// 監査設定
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// 操作メタデータレジストリ
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// ポイントカット
    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    /// 呼び出し元が不明な場合のアクター
    pub fn default_actor(&self) -> Actor {
        Actor::new(
            self.config.default_actor_id,
            self.config.default_actor_name.clone(),
        )
    }

    /// ハンドラー呼び出しをフックで包んで実行する
    ///
    /// ポイントカット外の呼び出しはそのまま実行する。
    /// 戻り値が `Ok(None)` になるのは `FailureMode::Suppress` で失敗を握りつぶしたときだけ。
    pub async fn intercept<T, E, Fut>(
        &self,
        invocation: &Invocation,
        proceed: Fut,
    ) -> Result<Option<T>, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: AuditedError,
    {
        if !self.pointcut.matches(&invocation.handler) {
            return proceed.await.map(Some);
        }

        self.before(invocation);

        let start = Instant::now();
        match proceed.await {
            Ok(value) => {
                self.diagnostics
                    .timing(&invocation.handler, start.elapsed(), None);
                self.after(invocation).await;
                self.after_returning(invocation);
                Ok(Some(value))
            }
            Err(err) => {
                let failure = HandlerFailure {
                    code: err.error_code(),
                    message: err.to_string(),
                };
                self.diagnostics.timing(
                    &invocation.handler,
                    start.elapsed(),
                    Some(failure.message.as_str()),
                );
                match self.config.failure_mode {
                    FailureMode::Propagate => {
                        self.after_throwing(invocation, &failure).await;
                        Err(err)
                    }
                    FailureMode::Suppress => {
                        self.after(invocation).await;
                        self.after_returning(invocation);
                        Ok(None)
                    }
                }
            }
        }
    }

    fn before(&self, invocation: &Invocation) {
        self.diagnostics
            .info(Hook::Before, &format!("before {}", invocation.handler));
    }

    async fn after(&self, invocation: &Invocation) {
        let operation = match self.registry.resolve_operation(&invocation.handler) {
            Ok(operation) => operation.clone(),
            Err(err) => {
                self.diagnostics
                    .error(Hook::After, &format!("after advice skipped: {}", err));
                return;
            }
        };

        let method = format!(
            "{}.{}",
            invocation.handler.signature(),
            operation.operation_type
        );
        self.diagnostics.info(
            Hook::After,
            &format!(
                "request method: {} description: {} requester: {} ip: {}",
                method, operation.operation_name, invocation.actor.name, invocation.origin
            ),
        );

        let record = LogRecord::success(
            operation.operation_name,
            method,
            invocation.actor.name.clone(),
            invocation.origin.clone(),
        );
        self.persist(Hook::After, record).await;
    }

    fn after_returning(&self, invocation: &Invocation) {
        self.diagnostics.info(
            Hook::AfterReturning,
            &format!("afterReturn {}", invocation.handler),
        );
    }

    async fn after_throwing(&self, invocation: &Invocation, failure: &HandlerFailure) {
        let params = serialize_args(&invocation.args, &self.config.param_separator);

        match self.registry.resolve_operation(&invocation.handler) {
            Ok(operation) => {
                let operation = operation.clone();
                self.diagnostics.info(
                    Hook::AfterThrowing,
                    &format!(
                        "exception code: {} detail: {} method: {}.{} description: {} requester: {} ip: {} params: {}",
                        failure.code,
                        failure.message,
                        invocation.handler.signature(),
                        operation.operation_type,
                        operation.operation_name,
                        invocation.actor.name,
                        invocation.origin,
                        params
                    ),
                );
                let record = LogRecord::failure(
                    operation.operation_name,
                    invocation.handler.signature(),
                    failure,
                    params.clone(),
                    invocation.actor.name.clone(),
                    invocation.origin.clone(),
                );
                self.persist(Hook::AfterThrowing, record).await;
            }
            Err(err) => {
                self.diagnostics.error(
                    Hook::AfterThrowing,
                    &format!("after throwing advice skipped: {}", err),
                );
            }
        }

        self.diagnostics.error(
            Hook::AfterThrowing,
            &format!(
                "exception method: {} code: {} detail: {} params: {}",
                invocation.handler, failure.code, failure.message, params
            ),
        );
    }

    async fn persist(&self, hook: Hook, record: LogRecord) {
        match self.sink.insert(&record).await {
            Ok(id) => {
                tracing::debug!(id, method = %record.method, log_type = record.log_type.as_i64(), "system log persisted");
            }
            Err(err) => {
                self.diagnostics.error(
                    hook,
                    &format!("Failed to persist system log for {}: {}", record.method, err),
                );
            }
        }
    }
}
