use colored::Colorize;
use std::path::Path;
use vdcflow_core::{Datacenter, list_datacenters, load_datacenter};

pub fn handle(root: &Path, datacenter: Option<&str>, location: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    println!("ルート: {}", root.display().to_string().cyan());

    let names = match datacenter {
        Some(name) => vec![name.to_string()],
        None => list_datacenters(root)?,
    };
    if names.is_empty() {
        anyhow::bail!("データセンターが1つもありません: {}", root.display());
    }

    for name in &names {
        let dc = load_datacenter(root, name, location)?;
        dc.validate()?;
        print_datacenter(&dc);
    }

    println!();
    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    Ok(())
}

fn print_datacenter(dc: &Datacenter) {
    println!();
    println!("データセンター: {}", dc.name.cyan().bold());
    println!("  サーバー: {}個", dc.servers.len());
    for (name, server) in &dc.servers {
        println!(
            "    - {} (ボリューム {}個, NIC {}個, ファイアウォールルール {}個)",
            name.cyan(),
            server.declared_volumes().len(),
            server.declared_nics().len(),
            server.firewall_rules().len()
        );
    }
}
