#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use vdcflow_cloud::{CloudApi, CloudError, Metadata, Resource, ResourceRef, Result};
use vdcflow_core::{Datacenter, load_datacenter};

pub const BASE: &str = "https://api.test/cloudapi/v6";

/// A recorded API call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(String),
    Get(String),
    Create { collection: String, body: Value },
    Update { href: String, body: Value },
    Delete(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Create { .. } | Call::Update { .. } | Call::Delete(_)
        )
    }
}

#[derive(Default)]
struct State {
    resources: HashMap<String, Resource>,
    collections: HashMap<String, Vec<String>>,
    scripted: HashMap<String, VecDeque<Option<String>>>,
    calls: Vec<Call>,
    next_id: u32,
}

/// In-memory API; every resource is AVAILABLE unless scripted otherwise
#[derive(Default)]
pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an AVAILABLE resource into a collection and return its href
    pub fn add(&self, collection: &str, properties: Value) -> String {
        self.insert(collection, properties).href
    }

    pub fn add_datacenter(&self, name: &str) -> String {
        self.add(
            &format!("{BASE}/datacenters"),
            serde_json::json!({ "name": name }),
        )
    }

    /// States returned by successive GETs; the last one repeats forever
    pub fn script_states(&self, href: &str, states: &[Option<&str>]) {
        let mut state = self.state.lock().unwrap();
        state.scripted.insert(
            href.to_string(),
            states.iter().map(|s| s.map(str::to_string)).collect(),
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn created_in(&self, collection: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create { collection: c, body } if c == collection => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn gets_of(&self, href: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Get(h) if h == href))
            .count()
    }

    pub fn resource(&self, href: &str) -> Option<Resource> {
        self.state.lock().unwrap().resources.get(href).cloned()
    }

    pub fn names_in(&self, collection: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter_map(|href| state.resources.get(href))
            .filter_map(|r| r.name().map(str::to_string))
            .collect()
    }

    fn insert(&self, collection: &str, properties: Value) -> Resource {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("id-{}", state.next_id);
        let href = format!("{collection}/{id}");
        let resource = Resource {
            id,
            href: href.clone(),
            properties: match properties {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            metadata: Some(Metadata {
                state: Some("AVAILABLE".to_string()),
            }),
        };
        state.resources.insert(href.clone(), resource.clone());
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(href);
        resource
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl CloudApi for FakeCloud {
    fn base_url(&self) -> &str {
        BASE
    }

    async fn list(&self, collection: &str) -> Result<Vec<ResourceRef>> {
        self.record(Call::List(collection.to_string()));
        let state = self.state.lock().unwrap();
        Ok(state
            .collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter_map(|href| state.resources.get(href))
            .map(|r| ResourceRef {
                id: r.id.clone(),
                href: r.href.clone(),
            })
            .collect())
    }

    async fn get(&self, href: &str) -> Result<Resource> {
        self.record(Call::Get(href.to_string()));
        let mut state = self.state.lock().unwrap();
        let scripted = state.scripted.get_mut(href).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        });
        let mut resource = state
            .resources
            .get(href)
            .cloned()
            .ok_or_else(|| CloudError::Api {
                status: 404,
                message: format!("{href} not found"),
            })?;
        if let Some(scripted) = scripted {
            resource.metadata = scripted.map(|s| Metadata { state: Some(s) });
        }
        Ok(resource)
    }

    async fn create(&self, collection: &str, body: &Value) -> Result<Resource> {
        self.record(Call::Create {
            collection: collection.to_string(),
            body: body.clone(),
        });
        Ok(self.insert(
            collection,
            body.get("properties").cloned().unwrap_or(Value::Null),
        ))
    }

    async fn update(&self, href: &str, body: &Value) -> Result<()> {
        self.record(Call::Update {
            href: href.to_string(),
            body: body.clone(),
        });
        let mut state = self.state.lock().unwrap();
        if let (Some(resource), Value::Object(patch)) = (state.resources.get_mut(href), body) {
            for (key, value) in patch {
                resource.properties.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, href: &str) -> Result<()> {
        self.record(Call::Delete(href.to_string()));
        let mut state = self.state.lock().unwrap();
        let prefix = format!("{href}/");
        state
            .resources
            .retain(|h, _| h != href && !h.starts_with(&prefix));
        for members in state.collections.values_mut() {
            members.retain(|h| h != href);
        }
        Ok(())
    }
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn load(root: &Path) -> Datacenter {
    load_datacenter(root, "lab", None).unwrap()
}

/// Server with a boot volume, a data volume and one NIC with two rules
pub const WEB1: &str = r#"{
  "server": {"properties": {"name": "web1", "cores": 2, "ram": 2048}},
  "volumes": [
    {"properties": {"name": "web1-boot", "image": "debian-12", "imagePassword": null, "size": 20}},
    {"properties": {"name": "web1-data", "size": 100}}
  ],
  "nics": [
    {"properties": {"name": "public", "lan": 1}, "firewallrules": [
      {"properties": {"name": "ssh", "protocol": "TCP", "portRangeStart": 22, "portRangeEnd": 22}},
      {"properties": {"name": "https", "protocol": "TCP", "portRangeStart": 443, "portRangeEnd": 443}}
    ]}
  ]
}"#;
