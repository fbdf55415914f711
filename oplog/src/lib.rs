//! oplog - コントローラー層の操作監査ログ
//!
//! コントローラーのハンドラー呼び出しをインターセプトし、
//! 成功・失敗を監査ログとして永続化する

#![warn(missing_docs)]

/// 共通型定義（oplog-commonの再エクスポート）
pub use oplog_common as common;

/// エラー型
pub mod error;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 監査インターセプター（ポイントカット・フック・ミドルウェア）
pub mod interceptor;

/// データベースアクセス
pub mod db;

/// ユーザーサービス
pub mod service;

/// 監査対象のコントローラー
pub mod controller;

/// REST APIハンドラー
pub mod api;

/// CLIインターフェース
pub mod cli;

/// サーバー起動
pub mod server;

use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 監査インターセプター
    pub interceptor: Arc<interceptor::AuditInterceptor>,
    /// 監査ログストレージ
    pub system_log: Arc<db::system_log::SystemLogStorage>,
    /// ユーザーサービス
    pub user_service: Arc<dyn service::UserService>,
}
