//! Reconciliation engine
//!
//! Brings remote servers, volumes, NICs and firewall rules into agreement
//! with a loaded [`Datacenter`]. Every operation starts with a guard against
//! the live remote state and every mutating call is followed by an
//! availability barrier before the next dependent call is issued.
//!
//! Work is strictly sequential. A failure aborts the operation without
//! rollback; re-running the same invocation is the recovery path.

use crate::action::{Action, ActionType, ApplyResult, ResourceKind};
use crate::api::CloudApi;
use crate::barrier::{AvailabilityBarrier, BarrierConfig};
use crate::confirm::Confirm;
use crate::error::{CloudError, Result};
use crate::payload::{self, PayloadBuilder};
use crate::resolver::NameResolver;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};
use vdcflow_core::{
    Action as Requested, BootScriptAssembler, ComponentKind, ComponentSelector, Datacenter,
    FlowError, Invocation, Nic, Server, Volume,
};

/// Server lifecycle as driven by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    Creating,
    AttachingVolumes,
    AttachingNics,
    SyncingFirewall,
    Ready,
    DetachingNics,
    DetachingVolumes,
    Deleted,
}

impl fmt::Display for ServerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            ServerPhase::Creating => "creating",
            ServerPhase::AttachingVolumes => "attaching-volumes",
            ServerPhase::AttachingNics => "attaching-nics",
            ServerPhase::SyncingFirewall => "syncing-firewall",
            ServerPhase::Ready => "ready",
            ServerPhase::DetachingNics => "detaching-nics",
            ServerPhase::DetachingVolumes => "detaching-volumes",
            ServerPhase::Deleted => "deleted",
        };
        f.write_str(phase)
    }
}

/// Firewall rule name filter, anchored at the start of the name
struct RulePattern(Option<Regex>);

impl RulePattern {
    fn new(pattern: Option<&str>) -> Result<Self> {
        let Some(pattern) = pattern else {
            return Ok(Self(None));
        };
        Regex::new(&format!("^(?:{pattern})"))
            .map(|regex| Self(Some(regex)))
            .map_err(|e| CloudError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    fn matches(&self, name: &str) -> bool {
        self.0.as_ref().is_none_or(|regex| regex.is_match(name))
    }
}

/// Reconciles one datacenter against the remote API
pub struct Reconciler<'a> {
    api: &'a dyn CloudApi,
    datacenter: &'a Datacenter,
    confirm: &'a dyn Confirm,
    assembler: BootScriptAssembler,
    resolver: NameResolver<'a>,
    barrier: AvailabilityBarrier<'a>,
    datacenter_href: OnceCell<String>,
    journal: Mutex<Vec<Action>>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        api: &'a dyn CloudApi,
        datacenter: &'a Datacenter,
        confirm: &'a dyn Confirm,
    ) -> Self {
        let root = datacenter.dir.parent().unwrap_or_else(|| Path::new("."));
        Self {
            api,
            datacenter,
            confirm,
            assembler: BootScriptAssembler::for_datacenter(root, &datacenter.name),
            resolver: NameResolver::new(api),
            barrier: AvailabilityBarrier::new(api, BarrierConfig::default()),
            datacenter_href: OnceCell::new(),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn with_barrier(mut self, config: BarrierConfig) -> Self {
        self.barrier = AvailabilityBarrier::new(self.api, config);
        self
    }

    pub fn with_assembler(mut self, assembler: BootScriptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Actions applied so far, in order
    pub fn applied(&self) -> Vec<Action> {
        self.journal
            .lock()
            .map(|journal| journal.clone())
            .unwrap_or_default()
    }

    /// Run the operation selected by `invocation`
    #[instrument(skip_all, fields(datacenter = %self.datacenter.name, action = %invocation.action))]
    pub async fn run(&self, invocation: &Invocation) -> Result<ApplyResult> {
        let started = Instant::now();

        match (invocation.action, invocation.server.as_deref()) {
            (Requested::Create, None) => self.create_all().await?,
            (Requested::Delete, None) => self.delete_all().await?,
            (Requested::Create, Some(server)) => {
                self.create_or_attach(server, invocation.component.as_ref())
                    .await?
            }
            (Requested::Delete, Some(server)) => {
                self.delete_or_detach(server, invocation.component.as_ref())
                    .await?
            }
        }

        Ok(ApplyResult {
            actions: self.applied(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Create every declared server, in name order
    pub async fn create_all(&self) -> Result<()> {
        for name in self.datacenter.server_names() {
            self.create(&name).await?;
        }
        Ok(())
    }

    /// Delete every declared server after a single confirmation
    ///
    /// Every server must exist remotely; nothing is deleted otherwise.
    pub async fn delete_all(&self) -> Result<()> {
        let mut targets = Vec::new();
        for name in self.datacenter.server_names() {
            let href = self.server_href(&name).await?;
            targets.push((name, href));
        }

        self.ensure_confirmed(&format!(
            "Delete ALL servers of datacenter '{}'?",
            self.datacenter.name
        ))?;
        for (name, href) in &targets {
            self.delete_server(name, href).await?;
        }
        Ok(())
    }

    async fn create_or_attach(
        &self,
        server: &str,
        component: Option<&ComponentSelector>,
    ) -> Result<()> {
        self.datacenter.server(server)?;
        if self.find_server(server).await?.is_none() {
            if component.is_some() {
                debug!(server, "Server absent, component selector ignored");
            }
            self.create(server).await?;
            return Ok(());
        }

        match component {
            Some(ComponentSelector::Volume(name)) => {
                self.attach_component(server, ComponentKind::Volume, name)
                    .await
            }
            Some(ComponentSelector::Nic(name)) => {
                self.attach_component(server, ComponentKind::Nic, name)
                    .await
            }
            Some(ComponentSelector::FirewallRules(pattern)) => {
                self.sync_firewall_rules(server, Some(pattern)).await
            }
            None => Err(CloudError::AlreadyExists(server.to_string())),
        }
    }

    async fn delete_or_detach(
        &self,
        server: &str,
        component: Option<&ComponentSelector>,
    ) -> Result<()> {
        self.datacenter.server(server)?;
        match component {
            Some(ComponentSelector::Volume(name)) => {
                self.detach_component(server, ComponentKind::Volume, name)
                    .await
            }
            Some(ComponentSelector::Nic(name)) => {
                self.detach_component(server, ComponentKind::Nic, name)
                    .await
            }
            Some(ComponentSelector::FirewallRules(pattern)) => {
                self.delete_firewall_rules(server, pattern).await
            }
            None => self.delete(server).await.map(|_| ()),
        }
    }

    /// Create a server with its embedded entities, then attach its standalone
    /// volumes and NICs and create its firewall rules
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<ServerPhase> {
        let server = self.datacenter.server(name)?;
        let servers = self.servers_collection().await?;

        if self.resolver.find(&servers, name).await?.is_some() {
            return Err(CloudError::AlreadyExists(name.to_string()));
        }
        check_firewall_rule_names(server)?;

        self.enter(name, ServerPhase::Creating);
        info!("Creating server {}", name);
        let body = self.payloads().server(server)?;
        let created = self.api.create(&servers, &body).await?;
        self.resolver.remember(&servers, name, &created.href);
        self.record(
            Action::new(ActionType::Create, ResourceKind::Server, name).with_href(&created.href),
        );
        self.barrier.await_available(&[created.href.clone()]).await?;

        self.enter(name, ServerPhase::AttachingVolumes);
        for volume in &server.volumes {
            self.attach_volume(server, &created.href, volume).await?;
        }

        self.enter(name, ServerPhase::AttachingNics);
        for nic in &server.nics {
            self.attach_nic(server, &created.href, nic).await?;
        }

        self.enter(name, ServerPhase::SyncingFirewall);
        self.create_firewall_rules(server, &created.href, &RulePattern::new(None)?)
            .await?;

        self.enter(name, ServerPhase::Ready);
        Ok(ServerPhase::Ready)
    }

    /// Delete a server together with every NIC and volume attached to it
    /// remotely, declared or not
    #[instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> Result<ServerPhase> {
        self.datacenter.server(name)?;
        let href = self.server_href(name).await?;
        self.ensure_confirmed(&format!("Delete server '{name}'?"))?;
        self.delete_server(name, &href).await
    }

    async fn delete_server(&self, name: &str, href: &str) -> Result<ServerPhase> {
        let server_href = [href.to_string()];
        self.barrier.await_available(&server_href).await?;

        self.enter(name, ServerPhase::DetachingNics);
        self.detach_all(name, href, ComponentKind::Nic).await?;

        self.enter(name, ServerPhase::DetachingVolumes);
        self.detach_all(name, href, ComponentKind::Volume).await?;

        info!("Deleting server {}", name);
        self.api.delete(href).await?;
        self.resolver.forget(href);
        self.record(Action::new(ActionType::Delete, ResourceKind::Server, name).with_href(href));

        let datacenter_href = [self.datacenter_href().await?.to_string()];
        self.barrier.await_available(&datacenter_href).await?;

        self.enter(name, ServerPhase::Deleted);
        Ok(ServerPhase::Deleted)
    }

    async fn detach_all(&self, server: &str, server_href: &str, kind: ComponentKind) -> Result<()> {
        let collection = format!("{server_href}/{}", kind.collection());
        for item in self.api.list(&collection).await? {
            let component = self.api.get(&item.href).await?;
            let component_name = component.name().unwrap_or(&item.id).to_string();

            info!("Detaching {} {} from {}", kind, component_name, server);
            self.api.delete(&item.href).await?;
            self.resolver.forget(&item.href);
            self.record(
                Action::new(ActionType::Detach, resource_kind(kind), component_name)
                    .on_server(server)
                    .with_href(&item.href),
            );
            self.barrier.await_available(&[server_href.to_string()]).await?;
        }
        Ok(())
    }

    /// Attach one standalone-declared volume or NIC to an existing server
    #[instrument(skip(self))]
    pub async fn attach_component(
        &self,
        server: &str,
        kind: ComponentKind,
        name: &str,
    ) -> Result<()> {
        let declared = self.datacenter.component(server, kind, name)?;
        let href = self.server_href(server).await?;

        match kind {
            ComponentKind::Volume => {
                let volume = declared
                    .volume(name)
                    .ok_or_else(|| CloudError::not_found(kind.to_string(), name))?;
                self.attach_volume(declared, &href, volume).await
            }
            ComponentKind::Nic => {
                let nic = declared
                    .nic(name)
                    .ok_or_else(|| CloudError::not_found(kind.to_string(), name))?;
                self.attach_nic(declared, &href, nic).await
            }
        }
    }

    async fn attach_volume(
        &self,
        server: &Server,
        server_href: &str,
        volume: &Volume,
    ) -> Result<()> {
        let body = self.payloads().volume(&server.name, volume)?;
        info!("Attaching volume {} to {}", volume.name(), server.name);
        let attached = self
            .api
            .create(&format!("{server_href}/volumes"), &body)
            .await?;
        self.record(
            Action::new(ActionType::Attach, ResourceKind::Volume, volume.name())
                .on_server(&server.name)
                .with_href(&attached.href),
        );
        let server_hrefs = [server_href.to_string()];
        self.barrier.await_available(&server_hrefs).await?;

        if volume.is_boot() {
            info!("Setting {} as boot volume of {}", volume.name(), server.name);
            self.api
                .update(server_href, &payload::boot_volume(&attached.id))
                .await?;
            self.record(
                Action::new(ActionType::SetBootVolume, ResourceKind::Volume, volume.name())
                    .on_server(&server.name)
                    .with_href(&attached.href),
            );
            self.barrier.await_available(&server_hrefs).await?;
        }
        Ok(())
    }

    async fn attach_nic(&self, server: &Server, server_href: &str, nic: &Nic) -> Result<()> {
        info!("Attaching nic {} to {}", nic.name(), server.name);
        let attached = self
            .api
            .create(&format!("{server_href}/nics"), &payload::nic(nic))
            .await?;
        self.record(
            Action::new(ActionType::Attach, ResourceKind::Nic, nic.name())
                .on_server(&server.name)
                .with_href(&attached.href),
        );
        self.barrier.await_available(&[server_href.to_string()]).await
    }

    /// Delete one declared volume or NIC from a server
    #[instrument(skip(self))]
    pub async fn detach_component(
        &self,
        server: &str,
        kind: ComponentKind,
        name: &str,
    ) -> Result<()> {
        let declared = self.datacenter.server(server)?;
        if !declared.declares(kind, name) {
            let available = match kind {
                ComponentKind::Volume => declared
                    .declared_volumes()
                    .iter()
                    .map(|v| v.name().to_string())
                    .collect(),
                ComponentKind::Nic => declared
                    .declared_nics()
                    .iter()
                    .map(|n| n.name().to_string())
                    .collect(),
            };
            return Err(FlowError::ComponentNotDeclared {
                kind: kind.to_string(),
                name: name.to_string(),
                server: server.to_string(),
                available,
            }
            .into());
        }

        let server_href = self.server_href(server).await?;
        self.ensure_confirmed(&format!("Detach {kind} '{name}' from server '{server}'?"))?;
        let href = self
            .resolver
            .resolve(
                &format!("{server_href}/{}", kind.collection()),
                name,
                &kind.to_string(),
            )
            .await?;

        info!("Detaching {} {} from {}", kind, name, server);
        self.api.delete(&href).await?;
        self.resolver.forget(&href);
        self.record(
            Action::new(ActionType::Detach, resource_kind(kind), name)
                .on_server(server)
                .with_href(&href),
        );
        self.barrier.await_available(&[server_href]).await
    }

    /// Create the declared firewall rules of a server whose names match
    /// `pattern` (all rules when `None`)
    #[instrument(skip(self))]
    pub async fn sync_firewall_rules(&self, server: &str, pattern: Option<&str>) -> Result<()> {
        let declared = self.datacenter.server(server)?;
        let pattern = RulePattern::new(pattern)?;
        check_firewall_rule_names(declared)?;

        let server_href = self.server_href(server).await?;
        self.create_firewall_rules(declared, &server_href, &pattern)
            .await
    }

    async fn create_firewall_rules(
        &self,
        server: &Server,
        server_href: &str,
        pattern: &RulePattern,
    ) -> Result<()> {
        let nics = format!("{server_href}/nics");
        for nic in server.declared_nics() {
            let rules: Vec<_> = nic
                .firewallrules
                .iter()
                .filter(|rule| pattern.matches(rule.name()))
                .collect();
            if rules.is_empty() {
                continue;
            }

            let nic_href = self.resolver.resolve(&nics, nic.name(), "nic").await?;
            for rule in rules {
                info!(
                    "Creating firewall rule {} on nic {} of {}",
                    rule.name(),
                    nic.name(),
                    server.name
                );
                let created = self
                    .api
                    .create(
                        &format!("{nic_href}/firewallrules"),
                        &payload::firewall_rule(rule),
                    )
                    .await?;
                self.record(
                    Action::new(ActionType::Create, ResourceKind::FirewallRule, rule.name())
                        .on_server(&server.name)
                        .with_href(&created.href),
                );
                self.barrier
                    .await_available(&[server_href.to_string()])
                    .await?;
            }
        }
        Ok(())
    }

    /// Delete remote firewall rules whose names match declared rules
    /// selected by `pattern`
    #[instrument(skip(self))]
    pub async fn delete_firewall_rules(&self, server: &str, pattern: &str) -> Result<()> {
        let declared = self.datacenter.server(server)?;
        let pattern = RulePattern::new(Some(pattern))?;
        let server_href = self.server_href(server).await?;

        let targets: Vec<(&Nic, Vec<&str>)> = declared
            .declared_nics()
            .into_iter()
            .map(|nic| {
                let names = nic
                    .rule_names()
                    .into_iter()
                    .filter(|name| pattern.matches(name))
                    .collect::<Vec<_>>();
                (nic, names)
            })
            .filter(|(_, names)| !names.is_empty())
            .collect();
        if targets.is_empty() {
            debug!("No declared firewall rule matches");
            return Ok(());
        }

        self.ensure_confirmed(&format!("Delete matching firewall rules of server '{server}'?"))?;

        let nics = format!("{server_href}/nics");
        for (nic, names) in targets {
            let nic_href = self.resolver.resolve(&nics, nic.name(), "nic").await?;
            for item in self.api.list(&format!("{nic_href}/firewallrules")).await? {
                let rule = self.api.get(&item.href).await?;
                let Some(rule_name) = rule.name() else {
                    continue;
                };
                if !names.contains(&rule_name) {
                    continue;
                }

                info!(
                    "Deleting firewall rule {} from nic {} of {}",
                    rule_name,
                    nic.name(),
                    server
                );
                self.api.delete(&item.href).await?;
                self.record(
                    Action::new(ActionType::Delete, ResourceKind::FirewallRule, rule_name)
                        .on_server(server)
                        .with_href(&item.href),
                );
            }
            self.barrier
                .await_available(&[server_href.clone()])
                .await?;
        }
        Ok(())
    }

    async fn datacenter_href(&self) -> Result<&str> {
        let href = self
            .datacenter_href
            .get_or_try_init(|| async {
                let collection = format!("{}/datacenters", self.api.base_url());
                self.resolver
                    .resolve(&collection, &self.datacenter.name, "datacenter")
                    .await
            })
            .await?;
        Ok(href.as_str())
    }

    async fn servers_collection(&self) -> Result<String> {
        Ok(format!("{}/servers", self.datacenter_href().await?))
    }

    async fn find_server(&self, name: &str) -> Result<Option<String>> {
        let servers = self.servers_collection().await?;
        self.resolver.find(&servers, name).await
    }

    async fn server_href(&self, name: &str) -> Result<String> {
        self.find_server(name)
            .await?
            .ok_or_else(|| CloudError::not_found("server", name))
    }

    fn payloads(&self) -> PayloadBuilder<'_> {
        PayloadBuilder::new(&self.assembler)
    }

    fn ensure_confirmed(&self, prompt: &str) -> Result<()> {
        if self.confirm.confirm(prompt) {
            Ok(())
        } else {
            Err(CloudError::Declined(prompt.to_string()))
        }
    }

    fn enter(&self, server: &str, phase: ServerPhase) {
        debug!(server, %phase, "Server phase");
    }

    fn record(&self, action: Action) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(action);
        }
    }
}

/// Reject duplicate firewall rule names on any declared NIC, standalone or embedded
fn check_firewall_rule_names(server: &Server) -> Result<()> {
    match server.duplicate_firewall_rule() {
        Some((nic, name)) => Err(CloudError::DuplicateName {
            nic: nic.to_string(),
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn resource_kind(kind: ComponentKind) -> ResourceKind {
    match kind {
        ComponentKind::Volume => ResourceKind::Volume,
        ComponentKind::Nic => ResourceKind::Nic,
    }
}
