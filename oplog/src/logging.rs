//! ロギング初期化ユーティリティ

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// デフォルトのフィルタ（`RUST_LOG` 未設定時）
pub const DEFAULT_FILTER: &str = "oplog=info,tower_http=info";

/// tracingサブスクライバーを初期化する
///
/// `RUST_LOG` があればそれを優先し、なければ [`DEFAULT_FILTER`] を使う。
/// 二重初期化はエラーとして返す。
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init();
        assert!(init().is_err());
    }
}
