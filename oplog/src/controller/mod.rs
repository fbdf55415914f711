//! 監査対象のコントローラー
//!
//! ルーターとレジストリ登録を対で提供する。登録時のターゲット名は
//! `{controller_namespace}.{コントローラー名}`。

/// コントローラーのエラー型
pub mod error;

/// ユーザーコントローラー
pub mod user;

pub use error::ControllerError;

use crate::error::AuditResult;
use crate::interceptor::registry::OperationRegistry;
use crate::AppState;
use axum::Router;

/// 全コントローラーのルーター
pub fn router() -> Router<AppState> {
    Router::new().merge(user::router())
}

/// 全コントローラーのハンドラーをレジストリに登録する
pub fn register(registry: &mut OperationRegistry, namespace: &str) -> AuditResult<()> {
    user::register(registry, namespace)
}
