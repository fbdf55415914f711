//! ユーザーサービス
//!
//! 監査対象コントローラーが呼び出すドメインサービス。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// ユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// ユーザーID
    pub id: i64,
    /// ユーザー名
    pub name: String,
}

/// ユーザーサービスのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserServiceError {
    /// 引数が不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 同名のユーザーが既に存在する
    #[error("User already exists: {0}")]
    UserExists(String),
}

/// ユーザーサービス
#[async_trait]
pub trait UserService: Send + Sync {
    /// ユーザーを追加する
    async fn add_user(&self, name: &str, password: &str) -> Result<User, UserServiceError>;

    /// 登録済みユーザーをID順で返す
    async fn list_users(&self) -> Vec<User>;
}

struct StoredUser {
    user: User,
    // 照合機能はないため保持のみ
    #[allow(dead_code)]
    password: String,
}

/// インメモリのユーザーサービス
#[derive(Default)]
pub struct InMemoryUserService {
    users: RwLock<Vec<StoredUser>>,
}

impl InMemoryUserService {
    /// 空のサービスを作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn add_user(&self, name: &str, password: &str) -> Result<User, UserServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserServiceError::InvalidArgument(
                "userName must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(UserServiceError::InvalidArgument(
                "password must not be empty".to_string(),
            ));
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.name == name) {
            return Err(UserServiceError::UserExists(name.to_string()));
        }

        let user = User {
            id: users.len() as i64 + 1,
            name: name.to_string(),
        };
        users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        Ok(user)
    }

    async fn list_users(&self) -> Vec<User> {
        self.users
            .read()
            .await
            .iter()
            .map(|u| u.user.clone())
            .collect()
    }
}
