//! データセンター定義

use super::{ComponentKind, Server};
use crate::error::{FlowError, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

/// データセンター（サーバー名をキーにした宣言の集合）
#[derive(Debug, Clone, PartialEq)]
pub struct Datacenter {
    pub name: String,
    /// データセンターのディレクトリ（`<root>/<name>`）
    pub dir: PathBuf,
    pub servers: BTreeMap<String, Server>,
}

impl Datacenter {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            servers: BTreeMap::new(),
        }
    }

    pub fn server_names(&self) -> Vec<String> {
        self.servers.keys().cloned().collect()
    }

    pub fn server(&self, name: &str) -> Result<&Server> {
        self.servers
            .get(name)
            .ok_or_else(|| FlowError::ServerNotDeclared {
                name: name.to_string(),
                available: self.server_names(),
            })
    }

    /// 付け外し対象のコンポーネントが単独宣言されているか確認
    pub fn component(&self, server: &str, kind: ComponentKind, name: &str) -> Result<&Server> {
        let declared = self.server(server)?;
        let names = declared.component_names(kind);
        if !names.iter().any(|n| n == name) {
            return Err(FlowError::ComponentNotDeclared {
                kind: kind.to_string(),
                name: name.to_string(),
                server: server.to_string(),
                available: names,
            });
        }
        Ok(declared)
    }

    /// 名前の必須チェックと、宣言リストごとの一意性チェック
    pub fn validate_names(&self) -> Result<()> {
        for (key, server) in &self.servers {
            if let Some(declared) = server.declared_name()
                && declared != key
            {
                return Err(FlowError::InvalidConfig(format!(
                    "{key}.json の server.properties.name が '{declared}' になっています"
                )));
            }

            let lists: [(&str, Vec<&str>); 4] = [
                (
                    "volumes",
                    server.volumes.iter().map(|v| v.name()).collect(),
                ),
                ("nics", server.nics.iter().map(|n| n.name()).collect()),
                (
                    "server.entities.volumes",
                    server
                        .template
                        .entities
                        .volumes
                        .items
                        .iter()
                        .map(|v| v.name())
                        .collect(),
                ),
                (
                    "server.entities.nics",
                    server
                        .template
                        .entities
                        .nics
                        .items
                        .iter()
                        .map(|n| n.name())
                        .collect(),
                ),
            ];

            for (list, names) in lists {
                let mut seen = HashSet::new();
                for name in names {
                    if name.is_empty() {
                        return Err(FlowError::InvalidConfig(format!(
                            "{key}.json の {list} に properties.name が無い要素があります"
                        )));
                    }
                    if !seen.insert(name) {
                        return Err(FlowError::DuplicateName {
                            scope: format!("server.{key}.{list}"),
                            name: name.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// 全体の検証（ファイアウォールルールの重複も含む）
    pub fn validate(&self) -> Result<()> {
        self.validate_names()?;
        for (key, server) in &self.servers {
            if let Some((nic, name)) = server.duplicate_firewall_rule() {
                return Err(FlowError::DuplicateName {
                    scope: format!("server.{key}.nics.{nic}.firewallrules"),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServerDocument;
    use serde_json::json;

    fn datacenter(documents: Vec<(&str, serde_json::Value)>) -> Datacenter {
        let mut dc = Datacenter::new("lab", "/datacenters/lab");
        for (name, value) in documents {
            let document: ServerDocument = serde_json::from_value(value).unwrap();
            dc.servers
                .insert(name.to_string(), Server::from_document(name, document));
        }
        dc
    }

    #[test]
    fn test_server_not_declared_lists_available() {
        let dc = datacenter(vec![("web1", json!({"server": {}}))]);
        match dc.server("db1") {
            Err(FlowError::ServerNotDeclared { name, available }) => {
                assert_eq!(name, "db1");
                assert_eq!(available, vec!["web1"]);
            }
            other => panic!("Expected ServerNotDeclared, got {:?}", other),
        }
    }

    #[test]
    fn test_component_must_be_standalone() {
        let dc = datacenter(vec![(
            "web1",
            json!({
                "server": {"entities": {"volumes": {"items": [{"properties": {"name": "data1"}}]}}},
                "volumes": [{"properties": {"name": "web1-boot"}}]
            }),
        )]);

        assert!(dc.component("web1", ComponentKind::Volume, "web1-boot").is_ok());
        assert!(matches!(
            dc.component("web1", ComponentKind::Volume, "data1"),
            Err(FlowError::ComponentNotDeclared { .. })
        ));
    }

    #[test]
    fn test_validate_names_rejects_mismatched_server_name() {
        let dc = datacenter(vec![(
            "web1",
            json!({"server": {"properties": {"name": "web2"}}}),
        )]);
        assert!(matches!(
            dc.validate_names(),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_names_rejects_duplicate_volumes() {
        let dc = datacenter(vec![(
            "web1",
            json!({
                "server": {},
                "volumes": [{"properties": {"name": "a"}}, {"properties": {"name": "a"}}]
            }),
        )]);
        match dc.validate_names() {
            Err(FlowError::DuplicateName { scope, name }) => {
                assert_eq!(scope, "server.web1.volumes");
                assert_eq!(name, "a");
            }
            other => panic!("Expected DuplicateName, got {:?}", other),
        }
    }

    #[test]
    fn test_standalone_and_embedded_may_share_names() {
        let dc = datacenter(vec![(
            "web1",
            json!({
                "server": {"entities": {"nics": {"items": [{"properties": {"name": "public"}}]}}},
                "nics": [{"properties": {"name": "public"}}]
            }),
        )]);
        assert!(dc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_firewall_rules() {
        let dc = datacenter(vec![(
            "web1",
            json!({
                "server": {},
                "nics": [{
                    "properties": {"name": "public"},
                    "firewallrules": [
                        {"properties": {"name": "ssh"}},
                        {"properties": {"name": "ssh"}}
                    ]
                }]
            }),
        )]);
        assert!(dc.validate_names().is_ok());
        assert!(matches!(
            dc.validate(),
            Err(FlowError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_validate_checks_embedded_nic_rules() {
        let dc = datacenter(vec![(
            "web1",
            json!({
                "server": {"entities": {"nics": {"items": [{
                    "properties": {"name": "public"},
                    "firewallrules": [
                        {"properties": {"name": "https"}},
                        {"properties": {"name": "https"}}
                    ]
                }]}}},
                "nics": [{"properties": {"name": "public"}}]
            }),
        )]);
        match dc.validate() {
            Err(FlowError::DuplicateName { scope, name }) => {
                assert_eq!(scope, "server.web1.nics.public.firewallrules");
                assert_eq!(name, "https");
            }
            other => panic!("Expected DuplicateName, got {:?}", other),
        }
    }
}
