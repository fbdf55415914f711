//! serve サブコマンド
//!
//! 監査ログサーバーを起動します。

use crate::config::{audit_config_from_env, server_config_from_env};
use crate::error::AuditResult;
use clap::Args;
use oplog_common::config::ServerConfig;

/// serve サブコマンドの引数
///
/// 未指定の項目は環境変数・デフォルト値から補われる。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, env = "OPLOG_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long, env = "OPLOG_HOST")]
    pub host: Option<String>,

    /// Database URL
    #[arg(long, env = "OPLOG_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl ServeArgs {
    /// 引数で指定された項目だけを上書きする
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        config
    }
}

/// serve サブコマンドを実行
pub async fn execute(args: &ServeArgs) -> AuditResult<()> {
    let server = args.apply(server_config_from_env());
    let audit = audit_config_from_env()?;
    crate::server::run(server, audit).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_given_fields() {
        let args = ServeArgs {
            port: Some(9000),
            ..ServeArgs::default()
        };
        let config = args.apply(ServerConfig::default());

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_url, "sqlite://oplog.db");
    }
}
