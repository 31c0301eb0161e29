use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// データセンター定義を置くテンポラリのルート
pub struct TestRoot {
    pub root: TempDir,
}

impl TestRoot {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}

pub const WEB1: &str = r#"{
  "server": {"properties": {"name": "web1", "cores": 2, "ram": 2048}},
  "volumes": [{"properties": {"name": "web1-boot", "image": "{{ image }}", "imagePassword": null}}],
  "nics": [{"properties": {"name": "public", "lan": 1}, "firewallrules": [
    {"properties": {"name": "ssh", "protocol": "TCP"}}
  ]}]
}"#;
