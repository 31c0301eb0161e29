//! 統合ローダー
//!
//! ファイル発見、プレースホルダ置換、パースを統合

use crate::discovery::{datacenter_dir, discover_files};
use crate::error::{FlowError, Result};
use crate::model::{Datacenter, Server, ServerDocument};
use crate::template::{Variables, substitute_placeholders};
use std::path::Path;
use tracing::{debug, info, instrument};

/// データセンターの宣言をロード
///
/// 以下の処理を実行:
/// 1. `<root>/<datacenter>/` の存在確認とファイルの発見
/// 2. ロケーション指定時は `.<location>.json` の変数を収集
/// 3. 各サーバーファイルのプレースホルダ置換
/// 4. JSONパースと名前の検証
#[instrument(skip(root), fields(root = %root.display()))]
pub fn load_datacenter(
    root: &Path,
    datacenter: &str,
    location: Option<&str>,
) -> Result<Datacenter> {
    // 1. ファイル発見
    let dc_dir = datacenter_dir(root, datacenter)?;
    let discovered = discover_files(&dc_dir, location)?;

    // 2. 変数収集
    let variables = match &discovered.location {
        Some(path) => read_variables(path)?,
        None => Variables::new(),
    };
    debug!(variables = variables.len(), "Collected location variables");

    // 3, 4. 置換とパース
    let mut dc = Datacenter::new(datacenter, &dc_dir);
    for path in &discovered.servers {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| FlowError::InvalidConfig(format!("無効なファイル名: {}", path.display())))?
            .to_string();
        let content = read_to_string(path)?;
        let document = parse_document(path, &content, &variables)?;
        dc.servers.insert(name.clone(), Server::from_document(name, document));
    }

    dc.validate_names()?;
    info!(
        datacenter = %dc.name,
        servers = dc.servers.len(),
        "Datacenter loaded successfully"
    );
    Ok(dc)
}

/// 置換後のJSON文字列をサーバー定義としてパース
pub fn parse_document(path: &Path, content: &str, variables: &Variables) -> Result<ServerDocument> {
    let substituted = substitute_placeholders(content, variables);
    serde_json::from_str(&substituted).map_err(|e| FlowError::JsonError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_variables(path: &Path) -> Result<Variables> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| FlowError::JsonError {
        path: path.to_path_buf(),
        message: format!("変数ファイルは文字列のみのオブジェクトである必要があります: {e}"),
    })
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| FlowError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
