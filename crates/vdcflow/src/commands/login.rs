use crate::credentials;
use colored::Colorize;
use std::path::Path;
use vdcflow_config::AUTH_HEADERS_FILE;

pub fn handle(root: &Path, global: bool) -> anyhow::Result<()> {
    let path = if global {
        vdcflow_config::global_auth_headers_path()?
    } else {
        root.join(AUTH_HEADERS_FILE)
    };

    let auth = credentials::prompt()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    auth.save(&path)?;
    println!(
        "{} {}",
        "✓ 認証情報を保存しました:".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}
