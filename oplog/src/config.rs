//! Configuration management via environment variables
//!
//! Provides helper functions for reading `OPLOG_*` environment variables and
//! loaders for the audit/server configuration structs.

use oplog_common::config::{AuditConfig, FailureMode, ServerConfig};
use oplog_common::error::CommonError;

/// Get an environment variable, or `None` when unset or not valid unicode
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Get an environment variable with a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable parsed to a specific type
///
/// Falls back to `default` when the variable is unset or parsing fails.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match get_env(name) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    "Environment variable '{}' has an invalid value '{}', using default",
                    name,
                    raw
                );
                default
            }
        },
        None => default,
    }
}

/// 監査設定を環境変数から読み込む
///
/// `OPLOG_FAILURE_MODE` が不正な値の場合は設定エラーを返す。
pub fn audit_config_from_env() -> Result<AuditConfig, CommonError> {
    let defaults = AuditConfig::default();

    let failure_mode = match get_env("OPLOG_FAILURE_MODE") {
        Some(raw) => raw.parse::<FailureMode>()?,
        None => defaults.failure_mode,
    };

    let controller_namespace =
        get_env_or("OPLOG_CONTROLLER_NAMESPACE", &defaults.controller_namespace);
    if controller_namespace.trim().is_empty() {
        return Err(CommonError::Config(
            "controller namespace must not be empty".to_string(),
        ));
    }

    Ok(AuditConfig {
        controller_namespace,
        failure_mode,
        default_actor_id: get_env_parse("OPLOG_DEFAULT_ACTOR_ID", defaults.default_actor_id),
        default_actor_name: get_env_or("OPLOG_DEFAULT_ACTOR_NAME", &defaults.default_actor_name),
        default_origin: get_env_or("OPLOG_DEFAULT_ORIGIN", &defaults.default_origin),
        param_separator: get_env_or("OPLOG_PARAM_SEPARATOR", &defaults.param_separator),
        trust_actor_headers: get_env_parse(
            "OPLOG_TRUST_ACTOR_HEADERS",
            defaults.trust_actor_headers,
        ),
    })
}

/// サーバー設定を環境変数から読み込む
pub fn server_config_from_env() -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        host: get_env_or("OPLOG_HOST", &defaults.host),
        port: get_env_parse("OPLOG_PORT", defaults.port),
        database_url: get_env_or("OPLOG_DATABASE_URL", &defaults.database_url),
    }
}
