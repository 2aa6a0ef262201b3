//! GC-MS集計の型定義
//!
//! CLIの各ステージ間で受け渡される型:
//! - CompoundRecord: 入力シートの1行（Library Match / Confidence + 全列）
//! - FileResult: 1ファイル分のフィルタ済み結果
//! - ReplicateGroup / ReplicateSet: レプリケートグループ（集計→検索へ渡す）
//! - LookupOutcome: 化合物検索の結果

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 欠損セルの置換文字列
pub const NA: &str = "NA";

/// セル値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// 欠損値の代替（"NA"）
    pub fn na() -> Self {
        CellValue::Text(NA.to_string())
    }

    /// 数値として解釈（文字列の数値も許容）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Bool(_) => None,
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, CellValue::Text(s) if s == NA)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// 入力シートの1行
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundRecord {
    /// 化合物名（Library Match列）
    pub library_match: String,
    /// 一致スコア（Confidence列、0-100）
    pub confidence: f64,
    /// ヘッダー順の全セル（欠損は "NA"）
    pub cells: Vec<CellValue>,
}

/// ファイルの解析状態
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Parsed,
    /// 必要なシート・列がないファイル（空の結果として記録）
    NonStandard(String),
}

/// 1ファイル分の結果
#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    /// 入力ファイルのベース名（拡張子なし）
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<CompoundRecord>,
    pub status: FileStatus,
}

impl FileResult {
    pub fn non_standard(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
            records: Vec::new(),
            status: FileStatus::NonStandard(reason.into()),
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.status == FileStatus::Parsed
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// レプリケートグループ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicateGroup {
    pub label: String,
    /// 構成シート名
    pub members: Vec<String>,
    /// 重複除去済みの化合物名（初出順）
    #[serde(default)]
    pub compounds: Vec<String>,
}

/// レプリケートグループの集合（集計ステージ→検索ステージ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateSet {
    /// バージョン（互換性チェック用）
    pub version: u32,
    pub groups: Vec<ReplicateGroup>,
}

impl ReplicateSet {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(groups: Vec<ReplicateGroup>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            groups,
        }
    }

    /// JSON文字列から読み込み（バージョン不一致はエラー）
    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        if set.version != Self::CURRENT_VERSION {
            return Err(Error::UnsupportedVersion(set.version));
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 全グループの化合物数
    pub fn compound_count(&self) -> usize {
        self.groups.iter().map(|g| g.compounds.len()).sum()
    }
}

/// 化合物検索の結果
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found { cid: u64, smiles: String },
    NotFound,
    Error(String),
}
