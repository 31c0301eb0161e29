//! vdcflow core
//!
//! データセンターごとの JSON 宣言（あるべき状態）を読み込み、
//! サーバー・ボリューム・NIC・ファイアウォールルールのモデルとして提供します。

pub mod discovery;
pub mod error;
pub mod invocation;
pub mod loader;
pub mod model;
pub mod template;

pub use discovery::{DiscoveredFiles, datacenter_dir, discover_files, list_datacenters};
pub use error::{FlowError, Result};
pub use invocation::{Action, ComponentSelector, Invocation};
pub use loader::{load_datacenter, parse_document};
pub use model::*;
pub use template::{BootScriptAssembler, Variables, substitute_placeholders};
