//! REST APIとルーター組み立て

/// APIエラーレスポンス型
pub mod error;

/// 監査ログ一覧API
pub mod system_logs;

use crate::controller;
use crate::interceptor::actor::actor_middleware;
use crate::interceptor::middleware::audit_middleware;
use crate::AppState;
use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

/// アプリケーションのルーターを作成
///
/// レイヤーは外側から `TraceLayer → actor_middleware → audit_middleware` の順に適用される。
/// `actor_middleware` は `trust_actor_headers` が有効な場合のみ組み込む。
pub fn create_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(controller::router())
        .route("/api/system-logs", get(system_logs::list_system_logs))
        .layer(axum_middleware::from_fn_with_state(
            state.interceptor.clone(),
            audit_middleware,
        ));

    let router = if state.interceptor.config().trust_actor_headers {
        router.layer(axum_middleware::from_fn(actor_middleware))
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
