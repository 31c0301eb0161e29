mod commands;
mod confirm;
mod credentials;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vdcflow_cloud_ionos::IONOS_API_URL;
use vdcflow_core::Action;

#[derive(Parser)]
#[command(name = "vdc")]
#[command(about = "JSON で宣言したデータセンターを IONOS Cloud に反映する", long_about = None)]
struct Cli {
    /// データセンター定義のルートディレクトリ
    #[arg(long, global = true, env = "VDCFLOW_DATACENTERS")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// 操作対象の指定
#[derive(Args)]
pub struct Target {
    /// データセンター名（ルート直下のディレクトリ名）
    #[arg(env = "DATACENTER")]
    pub datacenter: String,
    /// 対象サーバー（省略時はデータセンター全体）
    #[arg(short, long, env = "SERVER")]
    pub server: Option<String>,
    /// 対象ボリューム
    #[arg(long, env = "VOLUME")]
    pub volume: Option<String>,
    /// 対象 NIC
    #[arg(long, env = "NIC")]
    pub nic: Option<String>,
    /// ファイアウォールルール名の正規表現（先頭一致）
    #[arg(long = "firewall-rule", env = "FIREWALLRULE")]
    pub firewall_rule: Option<String>,
    /// ロケーション（.<location>.json の値でプレースホルダーを置換）
    #[arg(short, long, env = "LOCATION")]
    pub location: Option<String>,
    /// API のベース URL
    #[arg(long, env = "VDCFLOW_API_URL", default_value = IONOS_API_URL)]
    pub api_url: String,
    /// 削除時の確認をスキップ
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// サーバーを作成、または既存サーバーにコンポーネントを追加
    Create(Target),
    /// サーバーを削除、または既存サーバーからコンポーネントを外す
    Delete(Target),
    /// ACTION 環境変数（create / delete）に従って実行
    Apply {
        /// create または delete
        #[arg(env = "ACTION")]
        action: Action,
        #[command(flatten)]
        target: Target,
    },
    /// 宣言を検証（API には接続しない）
    Validate {
        /// データセンター名（省略時は全データセンター）
        #[arg(env = "DATACENTER")]
        datacenter: Option<String>,
        /// ロケーション
        #[arg(short, long, env = "LOCATION")]
        location: Option<String>,
    },
    /// 認証情報を入力してルートに保存
    Login {
        /// ルートではなく ~/.config/vdcflow に保存
        #[arg(long)]
        global: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!();
        eprintln!("{}", "✗ エラー".red().bold());
        eprintln!("  {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Versionコマンドはルートディレクトリ不要
    if matches!(cli.command, Commands::Version) {
        println!("vdcflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let root = match cli.root {
        Some(root) => root,
        None => vdcflow_config::find_datacenters_root()?,
    };

    match cli.command {
        Commands::Create(target) => commands::apply::handle(&root, Action::Create, target).await,
        Commands::Delete(target) => commands::apply::handle(&root, Action::Delete, target).await,
        Commands::Apply { action, target } => commands::apply::handle(&root, action, target).await,
        Commands::Validate {
            datacenter,
            location,
        } => commands::validate::handle(&root, datacenter.as_deref(), location.as_deref()),
        Commands::Login { global } => commands::login::handle(&root, global),
        Commands::Version => unreachable!("Version is handled before root discovery"),
    }
}
