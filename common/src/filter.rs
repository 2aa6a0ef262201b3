//! 信頼度フィルタ
//!
//! 読み込んだ表（ヘッダー + 行）から:
//! 1. 欠損セルを "NA" に置換
//! 2. Confidence >= 閾値 の行のみ残す
//! 3. Confidence降順に安定ソート

use crate::types::{CellValue, CompoundRecord, FileResult, FileStatus};

/// 読み込み直後の表（欠損セルは None）
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<CellValue>>>,
}

/// 化合物名・信頼度の列名
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub compound_column: String,
    pub confidence_column: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            compound_column: "Library Match".into(),
            confidence_column: "Confidence".into(),
        }
    }
}

fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name.trim())
}

/// 欠損セルを "NA" に置換し、ヘッダー幅に揃える
pub fn fill_missing(row: Vec<Option<CellValue>>, width: usize) -> Vec<CellValue> {
    let mut cells: Vec<CellValue> = row
        .into_iter()
        .map(|c| c.unwrap_or_else(CellValue::na))
        .collect();
    cells.resize(width.max(cells.len()), CellValue::na());
    cells
}

/// 閾値以上の行を残し、信頼度降順に並べる（同値は入力順を維持）
pub fn filter_records(records: Vec<CompoundRecord>, threshold: f64) -> Vec<CompoundRecord> {
    let mut kept: Vec<CompoundRecord> = records
        .into_iter()
        .filter(|r| r.confidence >= threshold)
        .collect();
    // sort_by は安定ソート
    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    kept
}

/// 表をフィルタしてFileResultを作る
///
/// 化合物列・信頼度列のどちらかがない場合は空のNonStandard結果を返す。
/// 信頼度が数値でない行（"NA"を含む）は閾値判定で除外される。
pub fn filter_table(name: &str, table: RawTable, columns: &ColumnSpec, threshold: f64) -> FileResult {
    let Some(confidence_idx) = column_index(&table.headers, &columns.confidence_column) else {
        return FileResult::non_standard(
            name,
            format!("'{}' 列がありません", columns.confidence_column),
        );
    };
    let Some(compound_idx) = column_index(&table.headers, &columns.compound_column) else {
        return FileResult::non_standard(
            name,
            format!("'{}' 列がありません", columns.compound_column),
        );
    };

    let width = table.headers.len();
    let records = table
        .rows
        .into_iter()
        .filter_map(|row| {
            let cells = fill_missing(row, width);
            let confidence = cells[confidence_idx].as_number()?;
            Some(CompoundRecord {
                library_match: cells[compound_idx].to_string(),
                confidence,
                cells,
            })
        })
        .collect();

    FileResult {
        name: name.to_string(),
        headers: table.headers,
        records: filter_records(records, threshold),
        status: FileStatus::Parsed,
    }
}
