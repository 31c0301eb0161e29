use crate::Target;
use crate::confirm::InteractiveConfirm;
use crate::credentials;
use colored::Colorize;
use std::path::Path;
use std::time::{Duration, Instant};
use vdcflow_cloud::{ApplyResult, AssumeYes, Confirm, Reconciler};
use vdcflow_cloud_ionos::IonosClient;
use vdcflow_core::{Action, ComponentSelector, Invocation};

pub async fn handle(root: &Path, action: Action, target: Target) -> anyhow::Result<()> {
    let started = Instant::now();

    let component =
        ComponentSelector::from_parts(target.volume, target.nic, target.firewall_rule)?;
    let invocation = Invocation::new(target.datacenter, action)
        .with_server(target.server)
        .with_component(component)
        .with_location(target.location);

    println!(
        "{}",
        format!("データセンター {} を読み込み中...", invocation.datacenter).blue()
    );
    let datacenter = vdcflow_core::load_datacenter(
        root,
        &invocation.datacenter,
        invocation.location.as_deref(),
    )?;
    // 宣言されていないサーバーは認証前に弾く
    if let Some(server) = &invocation.server {
        datacenter.server(server)?;
    }

    let auth = credentials::load_or_prompt(root)?;
    let client = IonosClient::with_base_url(auth, &target.api_url)?;
    let confirm: Box<dyn Confirm> = if target.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InteractiveConfirm::stdio())
    };

    println!(
        "{} {}",
        "実行:".blue().bold(),
        describe(&invocation).cyan()
    );
    let engine = Reconciler::new(&client, &datacenter, confirm.as_ref());
    let result = engine.run(&invocation).await?;

    print_summary(&result, started.elapsed());
    Ok(())
}

fn describe(invocation: &Invocation) -> String {
    let scope = match &invocation.server {
        Some(server) => format!("server {server}"),
        None => format!("datacenter {}", invocation.datacenter),
    };
    let action = invocation.action;
    match &invocation.component {
        Some(ComponentSelector::Volume(name)) => format!("{action} volume {name} ({scope})"),
        Some(ComponentSelector::Nic(name)) => format!("{action} nic {name} ({scope})"),
        Some(ComponentSelector::FirewallRules(pattern)) => {
            format!("{action} firewall rules /{pattern}/ ({scope})")
        }
        None => format!("{action} {scope}"),
    }
}

fn print_summary(result: &ApplyResult, elapsed: Duration) {
    println!();
    for action in &result.actions {
        println!("  {} {}", "✓".green(), action);
    }
    println!("{} ({})", "=== Done!".green().bold(), result.summary());
    println!("=== Total time: {:.1}s", elapsed.as_secs_f64());
}
