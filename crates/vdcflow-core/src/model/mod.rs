//! モデル定義
//!
//! JSONで宣言された「あるべき状態」を表すデータモデルです。
//! ロード後は読み取り専用で、リクエストの組み立ては別の型で行います。

mod datacenter;
mod nic;
mod server;
mod volume;

// Re-exports
pub use datacenter::*;
pub use nic::*;
pub use server::*;
pub use volume::*;

/// プロバイダ固有のプロパティ（そのままAPIに渡す）
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// `properties.name`（無ければ空文字）
pub(crate) fn name_of(properties: &Properties) -> &str {
    properties
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
}
