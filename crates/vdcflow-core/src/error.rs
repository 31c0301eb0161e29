use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("JSONパースエラー: {path}\n理由: {message}")]
    JsonError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error(
        "データセンター '{name}' が見つかりません\n探索場所: {root}\nヒント: データセンター名はローカルのディレクトリ名と一致する必要があります"
    )]
    DatacenterNotFound { name: String, root: PathBuf },

    #[error("サーバー '{name}' は宣言されていません。利用可能: {available:?}")]
    ServerNotDeclared { name: String, available: Vec<String> },

    #[error("{kind} '{name}' はサーバー '{server}' に宣言されていません。利用可能: {available:?}")]
    ComponentNotDeclared {
        kind: String,
        name: String,
        server: String,
        available: Vec<String>,
    },

    #[error("名前が重複しています: {scope} に '{name}' が複数あります")]
    DuplicateName { scope: String, name: String },

    #[error("テンプレートエラー: {file}\n理由: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("インクルードファイル '{include}' が見つかりません\n探索場所: {searched:?}")]
    IncludeNotFound {
        include: String,
        searched: Vec<PathBuf>,
    },

    #[error("無効な指定: {0}")]
    InvalidSelection(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
