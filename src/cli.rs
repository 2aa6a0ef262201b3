use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gcms")]
#[command(about = "GC-MS解析結果の集計・レプリケート統合・PubChem構造取得ツール", long_about = None)]
pub struct Cli {
    /// 省略時は対話セッション
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話セッション（フォルダ→形式→閾値→グループ化→PubChem検索）
    Session,

    /// フォルダ内の表をフィルタして集計ワークブックとグラフを出力
    Analyze {
        /// GC-MS出力ファイルのフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// ファイル形式 (xlsx/xlsm/xls/xlsb/ods)
        #[arg(short, long, default_value = "xlsx")]
        format: TableFormat,

        /// 信頼度の閾値（100以下）
        #[arg(short, long, default_value = "70", allow_hyphen_values = true)]
        threshold: Threshold,

        /// グラフを出力しない
        #[arg(long)]
        no_plots: bool,
    },

    /// 集計ワークブックのシートをレプリケートグループにまとめる
    Group {
        /// 集計ワークブック
        #[arg(required = true)]
        workbook: PathBuf,

        /// グループ定義 "ラベル=シート1,シート2"（複数指定可、省略時はシートごと）
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },

    /// レプリケートグループJSONから化合物を検索しSDFを取得
    Resolve {
        /// replicates.json
        #[arg(required = true)]
        input: PathBuf,

        /// 出力先フォルダ（省略時はJSONと同じフォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定を書き出す
        #[arg(long)]
        init: bool,
    },
}

/// 入力表の形式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TableFormat {
    #[default]
    Xlsx,
    Xlsm,
    Xls,
    Xlsb,
    Ods,
}

impl TableFormat {
    /// ドット付き拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Xlsx => ".xlsx",
            TableFormat::Xlsm => ".xlsm",
            TableFormat::Xls => ".xls",
            TableFormat::Xlsb => ".xlsb",
            TableFormat::Ods => ".ods",
        }
    }

    /// ファイルの実際の拡張子から形式を判定
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_string();
        ext.parse().ok()
    }
}

impl std::str::FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.trim_start_matches('.') {
            "xlsx" => Ok(TableFormat::Xlsx),
            "xlsm" => Ok(TableFormat::Xlsm),
            "xls" => Ok(TableFormat::Xls),
            "xlsb" => Ok(TableFormat::Xlsb),
            "ods" => Ok(TableFormat::Ods),
            _ => Err(format!(
                "Unknown format: {}. Use xlsx, xlsm, xls, xlsb, or ods",
                s.trim()
            )),
        }
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// 信頼度の閾値（上限100、下限なし）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Threshold(i64);

impl Threshold {
    pub const MAX: i64 = 100;

    pub fn value(&self) -> f64 {
        self.0 as f64
    }
}

impl std::str::FromStr for Threshold {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("整数ではありません: {}", s.trim()))?;
        if value > Self::MAX {
            return Err(format!("{} は{}を超えています", value, Self::MAX));
        }
        Ok(Threshold(value))
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
