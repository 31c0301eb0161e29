use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "データセンター定義のルートディレクトリが見つかりません。以下の場所を確認してください:\n\
        - VDCFLOW_DATACENTERS 環境変数\n\
        - ./datacenters\n\
        - /datacenters"
    )]
    DatacentersRootNotFound,

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
