use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("未対応のファイル形式: {0}（対応形式: .xlsx .xlsm .xls .xlsb .ods）")]
    UnsupportedFormat(String),

    #[error("無効な閾値: {0}")]
    InvalidThreshold(String),

    #[error("対象ファイルが見つかりません: {0}")]
    NoInputFiles(String),

    #[error("表の読み込みエラー ({file}): {message}")]
    TableRead { file: String, message: String },

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("グラフ描画エラー: {0}")]
    ChartRender(String),

    #[error("PubChemクライアント初期化エラー: {0}")]
    Client(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] gcms_common::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
