//! Action journal for reconciliation runs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote resource touched by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Server,
    Volume,
    Nic,
    FirewallRule,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Server => write!(f, "server"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::Nic => write!(f, "nic"),
            ResourceKind::FirewallRule => write!(f, "firewall rule"),
        }
    }
}

/// Type of action performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a server or firewall rule
    Create,
    /// Attach a volume or NIC to a server
    Attach,
    /// Select the boot volume of a server
    SetBootVolume,
    /// Detach a volume or NIC from a server
    Detach,
    /// Delete a server or firewall rule
    Delete,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Attach => write!(f, "attach"),
            ActionType::SetBootVolume => write!(f, "set-boot-volume"),
            ActionType::Detach => write!(f, "detach"),
            ActionType::Delete => write!(f, "delete"),
        }
    }
}

/// A completed remote mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub resource_kind: ResourceKind,
    /// Resource name (`properties.name`)
    pub name: String,
    /// Owning server, for components and rules
    pub server: Option<String>,
    pub href: Option<String>,
}

impl Action {
    pub fn new(
        action_type: ActionType,
        resource_kind: ResourceKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            resource_kind,
            name: name.into(),
            server: None,
            href: None,
        }
    }

    pub fn on_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} '{}'", self.action_type, self.resource_kind, self.name)?;
        if let Some(server) = &self.server {
            write!(f, " (server {})", server)?;
        }
        Ok(())
    }
}

/// Result of a reconciliation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Actions in the order they were applied
    pub actions: Vec<Action>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// One-line summary, e.g. `1 create, 2 attach`
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no changes".to_string();
        }

        let counts: Vec<String> = [
            ActionType::Create,
            ActionType::Attach,
            ActionType::SetBootVolume,
            ActionType::Detach,
            ActionType::Delete,
        ]
        .into_iter()
        .filter_map(|action_type| {
            let count = self.actions_by_type(action_type).len();
            (count > 0).then(|| format!("{} {}", count, action_type))
        })
        .collect();
        counts.join(", ")
    }
}
