//! Request payload builders
//!
//! Payloads are built from fresh copies of the declared entities; the loaded
//! datacenter is never mutated.

use crate::error::Result;
use crate::secret::ImagePassword;
use serde_json::{Map, Value, json};
use vdcflow_core::{
    BootScriptAssembler, FirewallRule, Nic, Properties, Server, Volume,
    model::ImagePassword as DeclaredPassword,
};

/// Builds request bodies, injecting secrets and boot scripts
pub struct PayloadBuilder<'a> {
    assembler: &'a BootScriptAssembler,
}

impl<'a> PayloadBuilder<'a> {
    pub fn new(assembler: &'a BootScriptAssembler) -> Self {
        Self { assembler }
    }

    /// Server creation body with embedded volumes and NICs
    ///
    /// Embedded NICs lose their firewall rules; rules are created one by one
    /// after the server exists.
    pub fn server(&self, server: &Server) -> Result<Value> {
        let volumes = server
            .template
            .entities
            .volumes
            .items
            .iter()
            .map(|volume| self.volume(&server.name, volume))
            .collect::<Result<Vec<_>>>()?;
        let nics: Vec<Value> = server.template.entities.nics.items.iter().map(nic).collect();

        Ok(json!({
            "properties": server.template.properties,
            "entities": {
                "volumes": {"items": volumes},
                "nics": {"items": nics},
            }
        }))
    }

    /// Volume body (`{"properties": ...}`)
    ///
    /// An explicit `null` image password becomes a fresh random password.
    /// Boot volumes get `userData` when a cloud-config template exists.
    pub fn volume(&self, server: &str, volume: &Volume) -> Result<Value> {
        let mut properties = volume.properties.clone();

        if volume.image_password() == DeclaredPassword::Null {
            let password = ImagePassword::generate();
            properties.insert("imagePassword".to_string(), serde_json::to_value(&password)?);
        }

        if volume.is_boot() {
            if let Some(user_data) = self.assembler.assemble(server, volume.name())? {
                properties.insert("userData".to_string(), Value::String(user_data));
            }
        }

        Ok(wrap(properties))
    }
}

/// NIC body without firewall rules
pub fn nic(nic: &Nic) -> Value {
    wrap(nic.properties.clone())
}

/// Firewall rule body
pub fn firewall_rule(rule: &FirewallRule) -> Value {
    wrap(rule.properties.clone())
}

/// Server patch selecting a boot volume
pub fn boot_volume(volume_id: &str) -> Value {
    json!({"bootVolume": {"id": volume_id}})
}

fn wrap(properties: Properties) -> Value {
    let mut body = Map::new();
    body.insert("properties".to_string(), Value::Object(properties));
    Value::Object(body)
}
