//! oplog 共通クレート
//!
//! 監査ログの型定義・設定・エラー型をサーバークレートと共有する

#![warn(missing_docs)]

/// 監査ログの型定義
pub mod types;

/// 設定構造体
pub mod config;

/// エラー型
pub mod error;

/// IPアドレス正規化ユーティリティ
pub mod ip;
