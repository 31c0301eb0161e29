//! NIC とファイアウォールルール定義

use super::{Properties, name_of};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// ファイアウォールルール定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    #[serde(default)]
    pub properties: Properties,
}

impl FirewallRule {
    pub fn name(&self) -> &str {
        name_of(&self.properties)
    }
}

/// NIC 定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nic {
    #[serde(default)]
    pub properties: Properties,

    /// NIC に紐づくファイアウォールルール（サーバー作成APIには送らない）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firewallrules: Vec<FirewallRule>,
}

impl Nic {
    pub fn name(&self) -> &str {
        name_of(&self.properties)
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.firewallrules.iter().map(FirewallRule::name).collect()
    }

    /// 2回以上宣言されているルール名（宣言順、重複なし）
    pub fn duplicate_rule_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for name in self.rule_names() {
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }
}
