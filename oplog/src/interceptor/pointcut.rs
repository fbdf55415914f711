//! ポイントカット
//!
//! コントローラー名前空間配下のハンドラーかどうかを判定する

use oplog_common::types::HandlerId;

/// 名前空間プレフィックスによるポイントカット
///
/// `namespace` そのもの、または `namespace.` で始まる型のハンドラーに一致する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointcut {
    namespace: String,
}

impl Pointcut {
    /// 名前空間を指定してポイントカットを作成
    ///
    /// 末尾の `.` は無視する（`a.b.` と `a.b` は同じ）。
    pub fn namespace(namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let namespace = namespace.trim().trim_end_matches('.').to_string();
        Self { namespace }
    }

    /// 対象の名前空間
    pub fn namespace_str(&self) -> &str {
        &self.namespace
    }

    /// ハンドラーがこのポイントカットに一致するか
    pub fn matches(&self, handler: &HandlerId) -> bool {
        if self.namespace.is_empty() {
            return false;
        }
        let target = handler.target.as_str();
        match target.strip_prefix(self.namespace.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}
