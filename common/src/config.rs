//! 設定管理
//!
//! AuditConfig, ServerConfig等の設定構造体

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ハンドラー失敗時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// 失敗を記録してから呼び出し元へそのまま返す
    #[default]
    Propagate,
    /// aroundフックで失敗を握りつぶす（旧来の挙動）
    Suppress,
}

impl FromStr for FailureMode {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "propagate" => Ok(Self::Propagate),
            "suppress" => Ok(Self::Suppress),
            other => Err(CommonError::Config(format!(
                "unknown failure mode '{}' (expected 'propagate' or 'suppress')",
                other
            ))),
        }
    }
}

/// 監査インターセプター設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// 監査対象のコントローラー名前空間 (デフォルト: "oplog.controller")
    #[serde(default = "default_controller_namespace")]
    pub controller_namespace: String,

    /// ハンドラー失敗時の扱い (デフォルト: propagate)
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// 呼び出し元が不明な場合のアクターID (デフォルト: 0)
    #[serde(default)]
    pub default_actor_id: i64,

    /// 呼び出し元が不明な場合のアクター名 (デフォルト: "anonymous")
    #[serde(default = "default_actor_name")]
    pub default_actor_name: String,

    /// リクエスト元IPが取得できない場合の値 (デフォルト: "127.0.0.1")
    #[serde(default = "default_origin")]
    pub default_origin: String,

    /// 引数シリアライズ時の区切り文字 (デフォルト: ";")
    #[serde(default = "default_param_separator")]
    pub param_separator: String,

    /// `x-actor-id` / `x-actor-name` ヘッダーを呼び出し元として信頼する (デフォルト: false)
    ///
    /// 有効にする場合、上流の認証プロキシがクライアント由来のヘッダーを除去・上書きすること。
    #[serde(default)]
    pub trust_actor_headers: bool,
}

fn default_controller_namespace() -> String {
    "oplog.controller".to_string()
}

fn default_actor_name() -> String {
    "anonymous".to_string()
}

fn default_origin() -> String {
    "127.0.0.1".to_string()
}

fn default_param_separator() -> String {
    ";".to_string()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            controller_namespace: default_controller_namespace(),
            failure_mode: FailureMode::default(),
            default_actor_id: 0,
            default_actor_name: default_actor_name(),
            default_origin: default_origin(),
            param_separator: default_param_separator(),
            trust_actor_headers: false,
        }
    }
}

/// サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// データベースURL (デフォルト: "sqlite://oplog.db")
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://oplog.db".to_string()
}

impl ServerConfig {
    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_config_defaults() {
        let config = AuditConfig::default();

        assert_eq!(config.controller_namespace, "oplog.controller");
        assert_eq!(config.failure_mode, FailureMode::Propagate);
        assert_eq!(config.default_actor_id, 0);
        assert_eq!(config.default_actor_name, "anonymous");
        assert_eq!(config.default_origin, "127.0.0.1");
        assert_eq!(config.param_separator, ";");
        assert!(!config.trust_actor_headers);
    }

    #[test]
    fn test_audit_config_deserialization() {
        let json = r#"{"controller_namespace":"com.nice.controller","failure_mode":"suppress"}"#;
        let config: AuditConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.controller_namespace, "com.nice.controller");
        assert_eq!(config.failure_mode, FailureMode::Suppress);
        // デフォルト値が適用される
        assert_eq!(config.param_separator, ";");
        assert!(!config.trust_actor_headers);
    }

    #[test]
    fn test_failure_mode_from_str() {
        assert_eq!("propagate".parse::<FailureMode>().unwrap(), FailureMode::Propagate);
        assert_eq!(" Suppress ".parse::<FailureMode>().unwrap(), FailureMode::Suppress);
        assert!("swallow".parse::<FailureMode>().is_err());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite://oplog.db");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
