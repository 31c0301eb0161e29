//! サーバー定義

use super::{FirewallRule, Nic, Properties, Volume, name_of};
use serde::{Deserialize, Serialize};
use std::fmt;

/// サーバーに付け外しできるコンポーネントの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Volume,
    Nic,
}

impl ComponentKind {
    /// リモートAPI上のコレクション名
    pub fn collection(&self) -> &'static str {
        match self {
            ComponentKind::Volume => "volumes",
            ComponentKind::Nic => "nics",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Volume => write!(f, "volume"),
            ComponentKind::Nic => write!(f, "nic"),
        }
    }
}

/// `{"items": [...]}` 形式のコレクション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Items<T> {
    #[serde(default)]
    pub items: Vec<T>,
}

impl<T> Default for Items<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

/// サーバー作成時に埋め込むエンティティ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub volumes: Items<Volume>,
    #[serde(default)]
    pub nics: Items<Nic>,
}

/// サーバー作成リクエストの元になる宣言
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerTemplate {
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub entities: Entities,
}

/// 1サーバー分のJSONファイル
///
/// ```json
/// {
///   "server": { "properties": {...}, "entities": { "volumes": {"items": []}, "nics": {"items": []} } },
///   "volumes": [ ... ],
///   "nics": [ { "properties": {...}, "firewallrules": [ ... ] } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDocument {
    pub server: ServerTemplate,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub nics: Vec<Nic>,
}

/// 宣言されたサーバー
///
/// `volumes` / `nics` は後から付け外しするための単独宣言で、
/// 名前による参照ではこちらが優先されます。
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    pub name: String,
    pub template: ServerTemplate,
    pub volumes: Vec<Volume>,
    pub nics: Vec<Nic>,
}

impl Server {
    pub fn from_document(name: impl Into<String>, document: ServerDocument) -> Self {
        Self {
            name: name.into(),
            template: document.server,
            volumes: document.volumes,
            nics: document.nics,
        }
    }

    /// `server.properties.name`（未指定なら None）
    pub fn declared_name(&self) -> Option<&str> {
        let name = name_of(&self.template.properties);
        (!name.is_empty()).then_some(name)
    }

    /// 単独宣言のボリューム
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name() == name)
    }

    /// 単独宣言のNIC
    pub fn nic(&self, name: &str) -> Option<&Nic> {
        self.nics.iter().find(|n| n.name() == name)
    }

    /// 単独宣言 + 埋め込み宣言のボリューム（同名は単独宣言が優先）
    pub fn declared_volumes(&self) -> Vec<&Volume> {
        merge_by_name(&self.volumes, &self.template.entities.volumes.items, Volume::name)
    }

    /// 単独宣言 + 埋め込み宣言のNIC（同名は単独宣言が優先）
    pub fn declared_nics(&self) -> Vec<&Nic> {
        merge_by_name(&self.nics, &self.template.entities.nics.items, Nic::name)
    }

    /// 付け外し対象として宣言されている名前一覧
    pub fn component_names(&self, kind: ComponentKind) -> Vec<String> {
        match kind {
            ComponentKind::Volume => self.volumes.iter().map(|v| v.name().to_string()).collect(),
            ComponentKind::Nic => self.nics.iter().map(|n| n.name().to_string()).collect(),
        }
    }

    /// 単独宣言・埋め込み宣言のどちらかに名前があるか
    pub fn declares(&self, kind: ComponentKind, name: &str) -> bool {
        match kind {
            ComponentKind::Volume => self.declared_volumes().iter().any(|v| v.name() == name),
            ComponentKind::Nic => self.declared_nics().iter().any(|n| n.name() == name),
        }
    }

    /// 同名のファイアウォールルールを持つ最初のNICとそのルール名
    ///
    /// 単独宣言と埋め込み宣言の両方を、同名NICの上書きなしで調べます。
    pub fn duplicate_firewall_rule(&self) -> Option<(&str, &str)> {
        self.nics
            .iter()
            .chain(&self.template.entities.nics.items)
            .find_map(|nic| {
                let duplicates = nic.duplicate_rule_names();
                duplicates.first().map(|rule| (nic.name(), *rule))
            })
    }

    /// 全NICのファイアウォールルール（NIC名とともに）
    pub fn firewall_rules(&self) -> Vec<(&Nic, &FirewallRule)> {
        self.declared_nics()
            .into_iter()
            .flat_map(|nic| nic.firewallrules.iter().map(move |rule| (nic, rule)))
            .collect()
    }
}

fn merge_by_name<'a, T>(
    primary: &'a [T],
    secondary: &'a [T],
    name: impl Fn(&T) -> &str,
) -> Vec<&'a T> {
    let mut merged: Vec<&T> = primary.iter().collect();
    for item in secondary {
        if !primary.iter().any(|p| name(p) == name(item)) {
            merged.push(item);
        }
    }
    merged
}
