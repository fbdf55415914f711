//! 呼び出し元の解決
//!
//! アクターとリクエスト元IPをリクエストから取り出す。
//! 上流の認証層が `Actor` extensionを設定していればそれを優先する。

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use oplog_common::ip::{normalize_ip, normalize_ip_str};
use oplog_common::types::Actor;
use std::net::SocketAddr;

/// アクターIDヘッダー
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// アクター名ヘッダー
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// ヘッダーからアクターを組み立てる
///
/// 名前ヘッダーがない場合は `None`。IDが数値でなければ0を使う。
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let name = headers
        .get(ACTOR_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    let id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0);
    Some(Actor::new(id, name))
}

/// ヘッダーからアクターを解決してextensionに設定するミドルウェア
///
/// 既に `Actor` が設定されている場合は上書きしない。
/// `x-actor-*` はクライアントが自由に設定できるため、このミドルウェアは
/// `AuditConfig::trust_actor_headers` が有効なときだけ組み込まれる。
/// その場合は上流の認証プロキシがヘッダーを除去または上書きしなければならない。
pub async fn actor_middleware(mut request: Request, next: Next) -> Response {
    if request.extensions().get::<Actor>().is_none() {
        if let Some(actor) = actor_from_headers(request.headers()) {
            request.extensions_mut().insert(actor);
        }
    }
    next.run(request).await
}

/// リクエスト元IPとして参照するプロキシヘッダー（優先順）
pub const FORWARDED_IP_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

/// リクエスト元IPを取得する（プロキシ対応）
///
/// `x-forwarded-for` → `x-real-ip` → 接続元アドレスの順に見る。
/// 解析できないヘッダーは読み飛ばして次の候補へ進む。
pub fn client_ip(request: &Request) -> Option<String> {
    let forwarded = FORWARDED_IP_HEADERS.iter().find_map(|name| {
        let raw = request.headers().get(*name)?.to_str().ok()?;
        match normalize_ip_str(raw) {
            Ok(ip) => Some(ip.to_string()),
            Err(e) => {
                tracing::debug!("Ignoring unparsable {} '{}': {}", name, raw, e);
                None
            }
        }
    });

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| normalize_ip(addr.ip()).to_string())
    })
}
