//! Remote API abstraction
//!
//! The remote side is a collection-of-resources HTTP interface keyed by
//! opaque `href` strings. Implementations only move JSON around; ordering,
//! idempotency and waiting live in the engine.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use vdcflow_core::Properties;

/// Remote API abstraction trait
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Base URL; the datacenters collection lives at `{base_url}/datacenters`
    fn base_url(&self) -> &str;

    /// List the members of a collection (collection GET)
    async fn list(&self, collection: &str) -> Result<Vec<ResourceRef>>;

    /// Read one resource (item GET)
    async fn get(&self, href: &str) -> Result<Resource>;

    /// Create a resource inside a collection (collection POST)
    async fn create(&self, collection: &str, body: &Value) -> Result<Resource>;

    /// Partially update a resource (item PATCH)
    async fn update(&self, href: &str, body: &Value) -> Result<()>;

    /// Delete a resource (item DELETE)
    async fn delete(&self, href: &str) -> Result<()>;
}

/// Member of a collection listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub id: String,
    pub href: String,
}

/// Collection listing (`{"items": [...]}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub items: Vec<ResourceRef>,
}

/// Resource metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub state: Option<String>,
}

/// Detail representation of a remote resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    pub href: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Resource {
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Current state; a missing state field counts as busy
    pub fn state(&self) -> ResourceState {
        match self.metadata.as_ref().and_then(|m| m.state.as_deref()) {
            None => ResourceState::Busy,
            Some(state) => ResourceState::from(state),
        }
    }
}

/// Remote resource state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Ready to be mutated further
    Available,
    /// Transient state while the remote side applies a change
    Busy,
    /// Any other state reported by the API (e.g. "INACTIVE", "DEPLOYING")
    Other(String),
}

impl ResourceState {
    pub fn is_available(&self) -> bool {
        matches!(self, ResourceState::Available)
    }
}

impl From<&str> for ResourceState {
    fn from(state: &str) -> Self {
        match state {
            "AVAILABLE" => ResourceState::Available,
            "BUSY" => ResourceState::Busy,
            other => ResourceState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Available => write!(f, "AVAILABLE"),
            ResourceState::Busy => write!(f, "BUSY"),
            ResourceState::Other(state) => write!(f, "{}", state),
        }
    }
}
