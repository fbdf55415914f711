//! サーバー起動
//!
//! 設定からアプリケーション状態を組み立て、HTTPサーバーを起動する。

use crate::api;
use crate::controller;
use crate::db::{self, system_log::SystemLogStorage};
use crate::error::AuditResult;
use crate::interceptor::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::interceptor::registry::OperationRegistry;
use crate::interceptor::AuditInterceptor;
use crate::service::InMemoryUserService;
use crate::AppState;
use oplog_common::config::{AuditConfig, ServerConfig};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// アプリケーション状態を作成（診断出力はtracing）
pub fn build_state(audit: AuditConfig, pool: SqlitePool) -> AuditResult<AppState> {
    build_state_with_diagnostics(audit, pool, Arc::new(TracingDiagnostics))
}

/// 診断出力先を指定してアプリケーション状態を作成
pub fn build_state_with_diagnostics(
    audit: AuditConfig,
    pool: SqlitePool,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> AuditResult<AppState> {
    let mut registry = OperationRegistry::new();
    controller::register(&mut registry, &audit.controller_namespace)?;

    let system_log = Arc::new(SystemLogStorage::new(pool));
    let interceptor = AuditInterceptor::new(audit, registry, system_log.clone())
        .with_diagnostics(diagnostics);

    Ok(AppState {
        interceptor: Arc::new(interceptor),
        system_log,
        user_service: Arc::new(InMemoryUserService::new()),
    })
}

/// サーバーを起動し、Ctrl+Cまで待ち受ける
pub async fn run(server: ServerConfig, audit: AuditConfig) -> AuditResult<()> {
    let pool = db::initialize_database(&server.database_url).await?;
    info!(
        namespace = %audit.controller_namespace,
        failure_mode = ?audit.failure_mode,
        "Audit interceptor configured"
    );
    let state = build_state(audit, pool)?;
    let app = api::create_app(state);

    let listener = tokio::net::TcpListener::bind(server.bind_addr()).await?;
    info!("oplog server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("oplog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
