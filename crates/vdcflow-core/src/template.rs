//! テンプレート展開機能
//!
//! - `{{ key }}` プレースホルダの置換（ロケーション別の変数ファイル）
//! - cloud-config テンプレートのインクルード展開と base64 エンコード

use crate::error::{FlowError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// 置換変数
pub type Variables = BTreeMap<String, String>;

/// `{{ key }}` を値で置換する
///
/// 空白は `{{` と `}}` の内側にちょうど1つずつの形式のみ対象です。
pub fn substitute_placeholders(text: &str, variables: &Variables) -> String {
    let mut result = text.to_string();
    for (key, value) in variables {
        let pattern = format!("{{{{ {} }}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// ブートボリュームに渡す userData を組み立てる
#[derive(Debug, Clone)]
pub struct BootScriptAssembler {
    cloud_configs_dir: PathBuf,
    /// インクルードの探索順（データセンター固有 → 共通）
    include_dirs: Vec<PathBuf>,
}

impl BootScriptAssembler {
    pub fn new(cloud_configs_dir: impl Into<PathBuf>, include_dirs: Vec<PathBuf>) -> Self {
        Self {
            cloud_configs_dir: cloud_configs_dir.into(),
            include_dirs,
        }
    }

    /// `<root>/<datacenter>/cloud-configs/` のテンプレートを使う
    ///
    /// インクルードは `<root>/<datacenter>/includes/`、
    /// 見つからなければ `<root>/includes/` から探します。
    pub fn for_datacenter(root: &Path, datacenter: &str) -> Self {
        let dc_dir = root.join(datacenter);
        Self::new(
            dc_dir.join("cloud-configs"),
            vec![dc_dir.join("includes"), root.join("includes")],
        )
    }

    /// ボリュームに対応するテンプレートファイル
    ///
    /// `<volume>.yaml` を優先し、無ければ `<server>-boot.yaml` を使います。
    pub fn template_for(&self, server: &str, volume: &str) -> Option<PathBuf> {
        [format!("{volume}.yaml"), format!("{server}-boot.yaml")]
            .into_iter()
            .map(|file| self.cloud_configs_dir.join(file))
            .find(|path| path.is_file())
    }

    /// テンプレートを展開して base64 にエンコード（テンプレートが無ければ None）
    #[instrument(skip(self))]
    pub fn assemble(&self, server: &str, volume: &str) -> Result<Option<String>> {
        let Some(template) = self.template_for(server, volume) else {
            debug!("No cloud-config template found");
            return Ok(None);
        };
        let expanded = self.expand_file(&template)?;
        debug!(template = %template.display(), bytes = expanded.len(), "Assembled cloud-config");
        Ok(Some(STANDARD.encode(expanded.as_bytes())))
    }

    /// インクルード行（`{{ file }}` で始まる行）をファイル内容で置き換える
    pub fn expand_file(&self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path).map_err(|e| FlowError::TemplateError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut result = String::with_capacity(content.len());
        for line in content.split_inclusive('\n') {
            match include_name(line) {
                Some(name) => {
                    let include = self.find_include(name)?;
                    let included =
                        std::fs::read_to_string(&include).map_err(|e| FlowError::IoError {
                            path: include.clone(),
                            message: e.to_string(),
                        })?;
                    result.push_str(&included);
                }
                None => result.push_str(line),
            }
        }
        Ok(result)
    }

    fn find_include(&self, name: &str) -> Result<PathBuf> {
        self.include_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| FlowError::IncludeNotFound {
                include: name.to_string(),
                searched: self.include_dirs.clone(),
            })
    }
}

fn include_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("{{")?;
    let name = rest.split("}}").next().unwrap_or_default().trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_substitute_placeholders() {
        let mut variables = Variables::new();
        variables.insert("lan".to_string(), "2".to_string());
        variables.insert("image".to_string(), "ubuntu:latest".to_string());

        assert_eq!(
            substitute_placeholders(r#"{"lan": {{ lan }}, "image": "{{ image }}"}"#, &variables),
            r#"{"lan": 2, "image": "ubuntu:latest"}"#
        );
        // 書式が異なるものは置換しない
        assert_eq!(substitute_placeholders("{{lan}}", &variables), "{{lan}}");
        assert_eq!(
            substitute_placeholders("{{ unknown }}", &variables),
            "{{ unknown }}"
        );
    }

    #[test]
    fn test_include_name() {
        assert_eq!(include_name("{{ users.yaml }}\n"), Some("users.yaml"));
        assert_eq!(include_name("{{packages.yaml}}"), Some("packages.yaml"));
        assert_eq!(include_name("  {{ indented.yaml }}"), None);
        assert_eq!(include_name("#cloud-config\n"), None);
    }

    #[test]
    fn test_expand_prefers_datacenter_includes() {
        let root = tempdir().unwrap();
        let dc = root.path().join("lab");
        fs::create_dir_all(dc.join("cloud-configs")).unwrap();
        fs::create_dir_all(dc.join("includes")).unwrap();
        fs::create_dir_all(root.path().join("includes")).unwrap();

        fs::write(
            dc.join("cloud-configs/web1-boot.yaml"),
            "#cloud-config\n{{ users.yaml }}\n{{ packages.yaml }}\nruncmd: []\n",
        )
        .unwrap();
        fs::write(dc.join("includes/users.yaml"), "users: [lab]\n").unwrap();
        fs::write(root.path().join("includes/users.yaml"), "users: [shared]\n").unwrap();
        fs::write(root.path().join("includes/packages.yaml"), "packages: [git]\n").unwrap();

        let assembler = BootScriptAssembler::for_datacenter(root.path(), "lab");
        let expanded = assembler
            .expand_file(&dc.join("cloud-configs/web1-boot.yaml"))
            .unwrap();
        assert_eq!(
            expanded,
            "#cloud-config\nusers: [lab]\npackages: [git]\nruncmd: []\n"
        );

        let encoded = assembler.assemble("web1", "web1-boot").unwrap().unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), expanded);
    }

    #[test]
    fn test_template_falls_back_to_server_boot_file() {
        let root = tempdir().unwrap();
        let configs = root.path().join("lab/cloud-configs");
        fs::create_dir_all(&configs).unwrap();
        fs::write(configs.join("web1-boot.yaml"), "#cloud-config\n").unwrap();

        let assembler = BootScriptAssembler::for_datacenter(root.path(), "lab");
        assert_eq!(
            assembler.template_for("web1", "web1-root-boot"),
            Some(configs.join("web1-boot.yaml"))
        );
        assert!(assembler.assemble("db1", "db1-boot").unwrap().is_none());
    }

    #[test]
    fn test_missing_include_is_an_error() {
        let root = tempdir().unwrap();
        let configs = root.path().join("lab/cloud-configs");
        fs::create_dir_all(&configs).unwrap();
        fs::write(configs.join("web1-boot.yaml"), "{{ nowhere.yaml }}\n").unwrap();

        let assembler = BootScriptAssembler::for_datacenter(root.path(), "lab");
        match assembler.assemble("web1", "web1-boot") {
            Err(FlowError::IncludeNotFound { include, searched }) => {
                assert_eq!(include, "nowhere.yaml");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("Expected IncludeNotFound, got {:?}", other),
        }
    }
}
