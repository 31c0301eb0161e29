//! ファイル自動発見機能
//!
//! `<root>/<datacenter>/*.json` をサーバー定義として発見します。
//! ドットで始まるファイル（`.auth_headers.json`、`.<location>.json` など）は対象外です。

use crate::error::{FlowError, Result};
use glob::MatchOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// 発見されたファイル群
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFiles {
    /// サーバー定義ファイル（ファイル名順）
    pub servers: Vec<PathBuf>,
    /// ロケーション別の置換変数ファイル (`.<location>.json`)
    pub location: Option<PathBuf>,
}

/// データセンターのディレクトリを取得
pub fn datacenter_dir(root: &Path, datacenter: &str) -> Result<PathBuf> {
    let dir = root.join(datacenter);
    if datacenter.is_empty() || datacenter.starts_with('.') || !dir.is_dir() {
        return Err(FlowError::DatacenterNotFound {
            name: datacenter.to_string(),
            root: root.to_path_buf(),
        });
    }
    Ok(dir)
}

/// データセンターのディレクトリからファイルを発見
#[instrument(skip(dc_dir), fields(dc_dir = %dc_dir.display()))]
pub fn discover_files(dc_dir: &Path, location: Option<&str>) -> Result<DiscoveredFiles> {
    let pattern = dc_dir.join("*.json");
    let pattern = pattern.to_string_lossy();
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut servers: Vec<PathBuf> = glob::glob_with(&pattern, options)
        .map_err(|e| FlowError::InvalidConfig(e.to_string()))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    servers.sort();
    debug!(count = servers.len(), "Discovered server files");

    let location = match location {
        Some(location) => {
            let path = dc_dir.join(format!(".{location}.json"));
            if !path.is_file() {
                return Err(FlowError::IoError {
                    path,
                    message: "ロケーションの変数ファイルがありません".to_string(),
                });
            }
            Some(path)
        }
        None => None,
    };

    Ok(DiscoveredFiles { servers, location })
}

/// `<root>` 直下のデータセンター名一覧
pub fn list_datacenters(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| FlowError::IoError {
        path: root.to_path_buf(),
        message: e.to_string(),
    })? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        // includes/ は共通インクルード置き場
        if entry.path().is_dir() && !name.starts_with('.') && name != "includes" {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_skips_hidden_files() {
        let root = tempdir().unwrap();
        let dc = root.path().join("lab");
        fs::create_dir_all(&dc).unwrap();
        fs::write(dc.join("web1.json"), "{}").unwrap();
        fs::write(dc.join("db1.json"), "{}").unwrap();
        fs::write(dc.join(".fra.json"), "{}").unwrap();
        fs::write(dc.join("notes.txt"), "").unwrap();

        let discovered = discover_files(&dc, Some("fra")).unwrap();
        assert_eq!(discovered.servers, vec![dc.join("db1.json"), dc.join("web1.json")]);
        assert_eq!(discovered.location, Some(dc.join(".fra.json")));
    }

    #[test]
    fn test_missing_location_file() {
        let root = tempdir().unwrap();
        let dc = root.path().join("lab");
        fs::create_dir_all(&dc).unwrap();

        assert!(discover_files(&dc, None).unwrap().location.is_none());
        assert!(matches!(
            discover_files(&dc, Some("ber")),
            Err(FlowError::IoError { .. })
        ));
    }

    #[test]
    fn test_datacenter_dir() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("lab")).unwrap();

        assert_eq!(
            datacenter_dir(root.path(), "lab").unwrap(),
            root.path().join("lab")
        );
        assert!(matches!(
            datacenter_dir(root.path(), "prod"),
            Err(FlowError::DatacenterNotFound { .. })
        ));
    }

    #[test]
    fn test_list_datacenters() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("lab")).unwrap();
        fs::create_dir_all(root.path().join("edge")).unwrap();
        fs::create_dir_all(root.path().join("includes")).unwrap();
        fs::write(root.path().join(".auth_headers.json"), "{}").unwrap();

        assert_eq!(list_datacenters(root.path()).unwrap(), vec!["edge", "lab"]);
    }
}
