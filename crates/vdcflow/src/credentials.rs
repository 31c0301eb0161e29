//! 認証情報の読み込み

use colored::Colorize;
use dialoguer::{Input, Password};
use std::path::Path;
use tracing::{debug, warn};
use vdcflow_cloud_ionos::AuthHeaders;

/// キャッシュされた認証ヘッダーを読み込み、無ければ対話的に入力してもらう
pub fn load_or_prompt(root: &Path) -> anyhow::Result<AuthHeaders> {
    if let Some(path) = vdcflow_config::find_auth_headers(root) {
        match AuthHeaders::from_file(&path) {
            Ok(headers) => {
                debug!(path = %path.display(), "Loaded auth headers");
                return Ok(headers);
            }
            Err(e) => warn!("{e}"),
        }
    }
    prompt()
}

/// ユーザー名・パスワード・契約番号を入力してもらう
pub fn prompt() -> anyhow::Result<AuthHeaders> {
    println!("{}", "IONOS Cloud の認証情報を入力してください".yellow());
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let contract_number: String = Input::new().with_prompt("Contract Number").interact_text()?;
    Ok(AuthHeaders::from_credentials(
        &username,
        &password,
        &contract_number,
    )?)
}
