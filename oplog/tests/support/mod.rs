//! 統合テスト用ヘルパー

#![allow(dead_code)]

use axum::{body::Body, http::Request, response::Response, Router};
use oplog::common::config::{AuditConfig, FailureMode};
use oplog::common::types::LogRecord;
use oplog::interceptor::diagnostics::RecordingDiagnostics;
use oplog::{api, db, server, AppState};
use std::sync::Arc;
use tempfile::TempDir;

/// 統合テストの名前空間
pub const NAMESPACE: &str = "com.nice.controller";

/// テスト用アプリケーション
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub diagnostics: Arc<RecordingDiagnostics>,
    _dir: TempDir,
}

/// 認証プロキシの背後にある構成（`x-actor-*` を信頼する）
pub fn audit_config(mode: FailureMode) -> AuditConfig {
    AuditConfig {
        controller_namespace: NAMESPACE.to_string(),
        failure_mode: mode,
        trust_actor_headers: true,
        ..AuditConfig::default()
    }
}

/// 一時ディレクトリのSQLiteでアプリケーションを組み立てる
pub async fn spawn_app(mode: FailureMode) -> TestApp {
    spawn_app_with(audit_config(mode)).await
}

/// 監査設定を指定してアプリケーションを組み立てる
pub async fn spawn_app_with(config: AuditConfig) -> TestApp {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("oplog.db").display());
    let pool = db::initialize_database(&url)
        .await
        .expect("initialize database");

    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let state =
        server::build_state_with_diagnostics(config, pool, diagnostics.clone())
            .expect("build state");

    TestApp {
        router: api::create_app(state.clone()),
        state,
        diagnostics,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::ServiceExt;
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// 新しい順の永続化済みレコード
    pub async fn records(&self) -> Vec<LogRecord> {
        self.state
            .system_log
            .list_recent(500)
            .await
            .expect("list system logs")
    }
}

/// `x-actor-*` ヘッダー付きのGETリクエスト
pub fn get_as(uri: &str, actor_id: i64, actor_name: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-actor-id", actor_id.to_string())
        .header("x-actor-name", actor_name)
        .body(Body::empty())
        .expect("build request")
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
