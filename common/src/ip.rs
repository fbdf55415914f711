//! IPアドレス正規化ユーティリティ
//!
//! リクエスト元IPを監査ログ用の文字列に整える

use crate::error::CommonError;
use std::net::IpAddr;

/// IPアドレスを正規化する
///
/// IPv4-mapped IPv6（::ffff:x.x.x.x）をIPv4に変換。
/// それ以外はそのまま返す。
pub fn normalize_ip(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// ヘッダー値などのIP文字列をパースして正規化する
///
/// `X-Forwarded-For` のようなカンマ区切りは先頭要素を採用する。
pub fn normalize_ip_str(raw: &str) -> Result<IpAddr, CommonError> {
    let first = raw.split(',').next().unwrap_or(raw).trim();
    let addr: IpAddr = first.parse()?;
    Ok(normalize_ip(addr))
}
