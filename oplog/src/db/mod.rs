//! データベースアクセス層
//!
//! SQLiteベースの監査ログ永続化

/// データベースマイグレーション
pub mod migrations;

/// 監査ログストレージ
pub mod system_log;

/// インメモリ監査ログストア
pub mod memory;

/// Repository traitパターン（永続化コラボレーター）
pub mod traits;

pub use migrations::initialize_database;

#[cfg(test)]
pub(crate) mod test_utils {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// テスト用のインメモリSQLiteプールを作成し、マイグレーションを実行する
    ///
    /// インメモリDBは接続ごとに独立するため接続数は1に固定する。
    pub async fn test_db_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        super::migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }
}
