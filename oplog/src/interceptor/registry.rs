//! 操作メタデータレジストリ
//!
//! ルート登録時にハンドラー識別子・引数名・操作メタデータを紐付ける。
//! 呼び出し時の解決はハンドラー識別子による完全一致のみ。

use crate::error::{AuditError, AuditResult};
use axum::http::Method;
use oplog_common::types::{HandlerId, OperationMetadata};
use std::collections::HashMap;

/// 監査対象ハンドラーの登録情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    /// ハンドラー識別子
    pub id: HandlerId,
    /// 宣言順の引数名（クエリ/フォームのキー）
    pub params: Vec<String>,
    /// 操作メタデータ（未設定は設定ミスとして扱う）
    pub operation: Option<OperationMetadata>,
}

impl HandlerSpec {
    /// 引数・メタデータなしで作成
    pub fn new(id: HandlerId) -> Self {
        Self {
            id,
            params: Vec::new(),
            operation: None,
        }
    }

    /// 引数名を設定
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// 操作メタデータを設定
    pub fn with_operation(
        mut self,
        operation_type: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        self.operation = Some(OperationMetadata::new(operation_type, operation_name));
        self
    }
}

/// ルート → ハンドラー → メタデータの対応表
#[derive(Debug, Default)]
pub struct OperationRegistry {
    routes: HashMap<(Method, String), HandlerId>,
    handlers: HashMap<HandlerId, HandlerSpec>,
}

impl OperationRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ルートにハンドラーを登録する
    ///
    /// 同じハンドラーを複数ルートに登録する場合は同一の `HandlerSpec` でなければならない。
    pub fn register_route(
        &mut self,
        method: Method,
        path: &str,
        spec: HandlerSpec,
    ) -> AuditResult<()> {
        let key = (method, path.to_string());
        if self.routes.contains_key(&key) {
            return Err(AuditError::DuplicateRoute(format!("{} {}", key.0, key.1)));
        }
        if let Some(existing) = self.handlers.get(&spec.id) {
            if existing != &spec {
                return Err(AuditError::ConflictingHandler(spec.id.to_string()));
            }
        }

        tracing::debug!(method = %key.0, path = %key.1, handler = %spec.id, "registered audited route");
        self.routes.insert(key, spec.id.clone());
        self.handlers.insert(spec.id.clone(), spec);
        Ok(())
    }

    /// ルートに対応するハンドラー登録情報
    pub fn handler_for_route(&self, method: &Method, path: &str) -> Option<&HandlerSpec> {
        self.routes
            .get(&(method.clone(), path.to_string()))
            .and_then(|id| self.handlers.get(id))
    }

    /// ハンドラーの操作メタデータを解決する
    pub fn resolve_operation(&self, id: &HandlerId) -> AuditResult<&OperationMetadata> {
        self.handlers
            .get(id)
            .and_then(|spec| spec.operation.as_ref())
            .ok_or_else(|| AuditError::MissingOperationMetadata(id.to_string()))
    }

    /// 登録済みルート数
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }
}
