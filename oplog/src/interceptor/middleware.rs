//! 監査ログミドルウェア
//!
//! レジストリに登録されたルートの呼び出しを `AuditInterceptor` に通す。
//! ハンドラーの失敗はresponse extensionsの `HandlerFailure` で判定し、
//! extensionのない4xx/5xx（extractorの拒否など）も失敗として扱う。

use super::actor::client_ip;
use super::{AuditInterceptor, AuditedError, Invocation};
use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body::Body as HttpBody;
use oplog_common::types::{Actor, HandlerFailure};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 引数取得のためにバッファするフォームボディの上限（axumの `DefaultBodyLimit` と同じ2MB）
///
/// これを超える、またはサイズ不明のボディは読まずにハンドラーへ渡す。
pub const MAX_FORM_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 失敗詳細として読み取るレスポンスボディの上限
pub const MAX_FAILURE_DETAIL_BYTES: usize = 4 * 1024;

/// ハンドラー到達前に拒否された4xxのエラーコード接頭辞
pub const REJECTION_CODE_PREFIX: &str = "axum::extract::rejection";

/// `HandlerFailure` のない5xxのエラーコード接頭辞
pub const SERVER_ERROR_CODE_PREFIX: &str = "axum::response";

/// 失敗したハンドラーのレスポンス
///
/// Propagateモードではこのレスポンスがそのまま呼び出し元に返る。
pub struct FailedResponse {
    failure: HandlerFailure,
    response: Response,
}

impl fmt::Display for FailedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.failure.message)
    }
}

impl AuditedError for FailedResponse {
    fn error_code(&self) -> String {
        self.failure.code.clone()
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// ボディのサイズが既知で `limit` 以下か
fn body_fits(body: &Body, limit: usize) -> bool {
    HttpBody::size_hint(body)
        .upper()
        .map(|upper| upper <= limit as u64)
        .unwrap_or(false)
}

/// クエリ文字列とフォームボディから引数候補を集める
///
/// フォームボディを読んだ場合はリクエストを組み立て直して返す。
/// ボディの読み取りに失敗した場合はハンドラーの代わりに返すレスポンスを `Err` で返す。
async fn collect_arguments(request: Request) -> (Result<Request, Response>, Vec<(String, String)>) {
    let mut pairs: Vec<(String, String)> = request
        .uri()
        .query()
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();

    if !is_form(request.headers()) {
        return (Ok(request), pairs);
    }
    if !body_fits(request.body(), MAX_FORM_BODY_BYTES) {
        debug!("Form body is unsized or over {} bytes, not captured for audit", MAX_FORM_BODY_BYTES);
        return (Ok(request), pairs);
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read form body for audit: {}", e);
            let response = (StatusCode::BAD_REQUEST, "invalid request body").into_response();
            return (Err(response), pairs);
        }
    };
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes) {
        Ok(form) => pairs.extend(form),
        Err(e) => warn!("Failed to parse form body for audit: {}", e),
    }

    (Ok(Request::from_parts(parts, Body::from(bytes))), pairs)
}

/// レスポンスボディを失敗詳細として読み、レスポンスを組み立て直す
async fn failure_detail(response: Response) -> (String, Response) {
    let fallback = response
        .status()
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    if !body_fits(response.body(), MAX_FAILURE_DETAIL_BYTES) {
        return (fallback, response);
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, MAX_FAILURE_DETAIL_BYTES).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let detail = if text.is_empty() { fallback } else { text };
            (detail, Response::from_parts(parts, Body::from(bytes)))
        }
        Err(e) => {
            warn!("Failed to read failure response body: {}", e);
            (fallback, Response::from_parts(parts, Body::empty()))
        }
    }
}

/// レスポンスを成功・失敗に分類する
async fn classify(response: Response) -> Result<Response, FailedResponse> {
    if let Some(failure) = response.extensions().get::<HandlerFailure>().cloned() {
        return Err(FailedResponse { failure, response });
    }

    let status = response.status();
    let prefix = if status.is_client_error() {
        REJECTION_CODE_PREFIX
    } else if status.is_server_error() {
        SERVER_ERROR_CODE_PREFIX
    } else {
        return Ok(response);
    };

    let (message, response) = failure_detail(response).await;
    Err(FailedResponse {
        failure: HandlerFailure {
            code: format!("{}::{}", prefix, status.as_u16()),
            message,
        },
        response,
    })
}

/// 監査ログミドルウェア
///
/// 呼び出し元アクター・リクエスト元IP・宣言順の引数を集めて
/// `AuditInterceptor::intercept` に渡す。`Router::layer` で適用すること
/// （ルーティング後に `MatchedPath` が使えるため）。
pub async fn audit_middleware(
    State(interceptor): State<Arc<AuditInterceptor>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let spec = match interceptor
        .registry()
        .handler_for_route(request.method(), &path)
    {
        Some(spec) if interceptor.pointcut().matches(&spec.id) => spec.clone(),
        _ => return next.run(request).await,
    };

    let actor = request
        .extensions()
        .get::<Actor>()
        .cloned()
        .unwrap_or_else(|| interceptor.default_actor());
    let origin =
        client_ip(&request).unwrap_or_else(|| interceptor.config().default_origin.clone());

    let (forward, pairs) = collect_arguments(request).await;
    let args = spec
        .params
        .iter()
        .map(|name| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| serde_json::Value::String(value.clone()))
                .unwrap_or(serde_json::Value::Null)
        })
        .collect();

    trace!(handler = %spec.id, path = %path, actor = %actor.name, "audited call captured");

    let invocation = Invocation {
        handler: spec.id,
        args,
        actor,
        origin,
    };
    let proceed = async move {
        let response = match forward {
            Ok(request) => next.run(request).await,
            Err(response) => response,
        };
        classify(response).await
    };

    match interceptor.intercept(&invocation, proceed).await {
        Ok(Some(response)) => response,
        Ok(None) => StatusCode::OK.into_response(),
        Err(failed) => failed.response,
    }
}
