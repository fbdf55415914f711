//! ユーザーコントローラー
//!
//! `/userController/*` のハンドラー。

use super::error::ControllerError;
use crate::error::AuditResult;
use crate::interceptor::registry::{HandlerSpec, OperationRegistry};
use crate::service::User;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::Method,
    routing::get,
    Form, Json, Router,
};
use oplog_common::types::HandlerId;
use serde::Deserialize;
use tracing::debug;

/// コントローラー名
pub const CONTROLLER_NAME: &str = "UserController";
/// ユーザー追加のパス
pub const TEST_AOP_PATH: &str = "/userController/testAOP";
/// ユーザー一覧のパス
pub const LIST_USERS_PATH: &str = "/userController/listUsers";

/// ユーザー追加の引数
///
/// 欠けた引数は空文字として扱い、サービス側で検証する。
#[derive(Debug, Default, Deserialize)]
pub struct TestAopParams {
    /// ユーザー名
    #[serde(rename = "userName", default)]
    pub user_name: String,
    /// パスワード
    #[serde(default)]
    pub password: String,
}

async fn test_aop(state: &AppState, params: TestAopParams) -> Result<Json<User>, ControllerError> {
    let user = state
        .user_service
        .add_user(&params.user_name, &params.password)
        .await?;
    debug!(user_id = user.id, user_name = %user.name, "User added");
    Ok(Json(user))
}

/// GET /userController/testAOP - ユーザー追加（クエリ）
pub async fn test_aop_query(
    State(state): State<AppState>,
    Query(params): Query<TestAopParams>,
) -> Result<Json<User>, ControllerError> {
    test_aop(&state, params).await
}

/// POST /userController/testAOP - ユーザー追加（フォーム）
pub async fn test_aop_form(
    State(state): State<AppState>,
    Form(params): Form<TestAopParams>,
) -> Result<Json<User>, ControllerError> {
    test_aop(&state, params).await
}

/// GET /userController/listUsers - ユーザー一覧
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.user_service.list_users().await)
}

/// ルーター
pub fn router() -> Router<AppState> {
    Router::new()
        .route(TEST_AOP_PATH, get(test_aop_query).post(test_aop_form))
        .route(LIST_USERS_PATH, get(list_users))
}

/// ハンドラーと操作メタデータを登録する
pub fn register(registry: &mut OperationRegistry, namespace: &str) -> AuditResult<()> {
    let target = format!("{}.{}", namespace.trim_end_matches('.'), CONTROLLER_NAME);

    let add_user = HandlerSpec::new(HandlerId::new(target.clone(), "testAOP"))
        .with_params(["userName", "password"])
        .with_operation("add操作:", "添加用户");
    registry.register_route(Method::GET, TEST_AOP_PATH, add_user.clone())?;
    registry.register_route(Method::POST, TEST_AOP_PATH, add_user)?;

    registry.register_route(
        Method::GET,
        LIST_USERS_PATH,
        HandlerSpec::new(HandlerId::new(target, "listUsers"))
            .with_operation("query操作:", "查询用户"),
    )?;
    Ok(())
}
