//! 実行パラメータ
//!
//! CLI で一度だけ組み立て、以降は参照で渡す不変の値です。

use crate::error::{FlowError, Result};
use crate::model::ComponentKind;
use std::fmt;
use std::str::FromStr;

/// 実行するアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
}

impl FromStr for Action {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(Action::Create),
            "delete" => Ok(Action::Delete),
            other => Err(FlowError::InvalidSelection(format!(
                "ACTION は create または delete を指定してください: {other}"
            ))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// 1回の実行で対象にできるコンポーネント（最大1つ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelector {
    Volume(String),
    Nic(String),
    /// ルール名の先頭にマッチする正規表現
    FirewallRules(String),
}

impl ComponentSelector {
    /// VOLUME / NIC / FIREWALLRULE の指定からセレクタを作る
    pub fn from_parts(
        volume: Option<String>,
        nic: Option<String>,
        firewallrule: Option<String>,
    ) -> Result<Option<Self>> {
        let mut selectors: Vec<Self> = [
            volume.map(Self::Volume),
            nic.map(Self::Nic),
            firewallrule.map(Self::FirewallRules),
        ]
        .into_iter()
        .flatten()
        .collect();

        if selectors.len() > 1 {
            return Err(FlowError::InvalidSelection(
                "VOLUME, NIC, FIREWALLRULE は同時に1つまでしか指定できません".to_string(),
            ));
        }
        Ok(selectors.pop())
    }

    /// ボリューム・NIC の場合は種類と名前
    pub fn component(&self) -> Option<(ComponentKind, &str)> {
        match self {
            Self::Volume(name) => Some((ComponentKind::Volume, name.as_str())),
            Self::Nic(name) => Some((ComponentKind::Nic, name.as_str())),
            Self::FirewallRules(_) => None,
        }
    }
}

/// 実行パラメータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub datacenter: String,
    pub action: Action,
    pub server: Option<String>,
    pub component: Option<ComponentSelector>,
    pub location: Option<String>,
}

impl Invocation {
    pub fn new(datacenter: impl Into<String>, action: Action) -> Self {
        Self {
            datacenter: datacenter.into(),
            action,
            server: None,
            component: None,
            location: None,
        }
    }

    pub fn with_server(mut self, server: Option<String>) -> Self {
        self.server = server;
        self
    }

    pub fn with_component(mut self, component: Option<ComponentSelector>) -> Self {
        self.component = component;
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }
}
