pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// ルートディレクトリを直接指定する環境変数
pub const DATACENTERS_ENV: &str = "VDCFLOW_DATACENTERS";

/// 認証ヘッダーのキャッシュファイル名（ルート直下）
pub const AUTH_HEADERS_FILE: &str = ".auth_headers.json";

/// 既定のルートディレクトリ
pub const DEFAULT_DATACENTERS_ROOT: &str = "/datacenters";

/// ユーザー共通の認証ヘッダーのファイル名
pub const GLOBAL_AUTH_HEADERS_FILE: &str = "auth_headers.json";

/// ユーザー共通の認証ヘッダーのパス (`~/.config/vdcflow/auth_headers.json`)
pub fn global_auth_headers_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(config_dir.join("vdcflow").join(GLOBAL_AUTH_HEADERS_FILE))
}

/// データセンター定義のルートディレクトリを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 VDCFLOW_DATACENTERS (直接パス指定)
/// 2. カレントディレクトリの ./datacenters
/// 3. /datacenters
pub fn find_datacenters_root() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(root) = std::env::var(DATACENTERS_ENV) {
        let path = PathBuf::from(root);
        if path.is_dir() {
            return Ok(path);
        }
    }

    // 2. カレントディレクトリ
    let local = std::env::current_dir()?.join("datacenters");
    if local.is_dir() {
        return Ok(local);
    }

    // 3. 既定の場所
    let global = PathBuf::from(DEFAULT_DATACENTERS_ROOT);
    if global.is_dir() {
        return Ok(global);
    }

    Err(ConfigError::DatacentersRootNotFound)
}

/// 認証ヘッダーのキャッシュファイルを探す
///
/// `<root>/.auth_headers.json` を優先し、無ければ
/// `~/.config/vdcflow/auth_headers.json` を使います。
pub fn find_auth_headers(root: &Path) -> Option<PathBuf> {
    select_auth_headers(root, global_auth_headers_path().ok())
}

fn select_auth_headers(root: &Path, global: Option<PathBuf>) -> Option<PathBuf> {
    let in_root = root.join(AUTH_HEADERS_FILE);
    if in_root.is_file() {
        return Some(in_root);
    }
    global.filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_global_auth_headers_path() {
        if let Ok(path) = global_auth_headers_path() {
            assert!(path.ends_with("vdcflow/auth_headers.json"));
        }
    }

    #[test]
    #[serial]
    fn test_find_root_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();

        unsafe {
            std::env::set_var(DATACENTERS_ENV, temp_dir.path());
        }

        let result = find_datacenters_root().unwrap();
        assert_eq!(result, temp_dir.path());

        unsafe {
            std::env::remove_var(DATACENTERS_ENV);
        }
    }

    #[test]
    #[serial]
    fn test_find_root_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::create_dir(temp_dir.path().join("datacenters")).unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_datacenters_root();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("datacenters"));
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_nowhere_falls_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        fs::create_dir(temp_dir.path().join("datacenters")).unwrap();

        unsafe {
            std::env::set_var(DATACENTERS_ENV, temp_dir.path().join("missing"));
        }
        std::env::set_current_dir(&temp_dir).unwrap();
        let result = find_datacenters_root();
        std::env::set_current_dir(original_dir).unwrap();
        unsafe {
            std::env::remove_var(DATACENTERS_ENV);
        }

        assert!(result.unwrap().ends_with("datacenters"));
    }

    #[test]
    fn test_auth_headers_in_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(AUTH_HEADERS_FILE), r#"{"headers": {}}"#).unwrap();

        let found = find_auth_headers(temp_dir.path()).unwrap();
        assert!(found.ends_with(".auth_headers.json"));
    }

    #[test]
    fn test_auth_headers_root_wins_over_global() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let global = home.path().join(GLOBAL_AUTH_HEADERS_FILE);
        fs::write(&global, r#"{"headers": {}}"#).unwrap();

        assert_eq!(
            select_auth_headers(root.path(), Some(global.clone())),
            Some(global.clone())
        );

        fs::write(root.path().join(AUTH_HEADERS_FILE), r#"{"headers": {}}"#).unwrap();
        assert_eq!(
            select_auth_headers(root.path(), Some(global)),
            Some(root.path().join(AUTH_HEADERS_FILE))
        );
    }

    #[test]
    fn test_auth_headers_missing_everywhere() {
        let root = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();

        assert_eq!(
            select_auth_headers(root.path(), Some(home.path().join(GLOBAL_AUTH_HEADERS_FILE))),
            None
        );
        assert_eq!(select_auth_headers(root.path(), None), None);
    }
}
