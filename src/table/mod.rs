//! 表読み込み・信頼度フィルタ
//!
//! calamineで指定シートを読み、共通ライブラリのフィルタに渡す。

use crate::cli::{TableFormat, Threshold};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::scanner::InputFile;
use calamine::{open_workbook, Data, Range, Reader, Sheets};
use gcms_common::{filter_table, CellValue, FileResult, RawTable};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

type Workbook = Sheets<BufReader<File>>;

/// 形式を指定してワークブックを開く
///
/// 実ファイルの拡張子が対応形式ならそちらを優先する。
fn open_sheets(path: &Path, format: TableFormat) -> std::result::Result<Workbook, calamine::Error> {
    let format = TableFormat::from_path(path).unwrap_or(format);
    let sheets = match format {
        TableFormat::Xlsx | TableFormat::Xlsm => Sheets::Xlsx(open_workbook(path)?),
        TableFormat::Xls => Sheets::Xls(open_workbook(path)?),
        TableFormat::Xlsb => Sheets::Xlsb(open_workbook(path)?),
        TableFormat::Ods => Sheets::Ods(open_workbook(path)?),
    };
    Ok(sheets)
}

fn table_read_error(path: &Path, message: impl ToString) -> PipelineError {
    PipelineError::TableRead {
        file: path.display().to_string(),
        message: message.to_string(),
    }
}

/// calamineのセルを共通型へ（空セル・空文字は欠損）
fn to_cell(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        other => Some(CellValue::Text(other.to_string())),
    }
}

/// 先頭行をヘッダーとして表に変換
fn range_to_table(range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return RawTable::default(),
    };
    let rows = rows.map(|row| row.iter().map(to_cell).collect()).collect();
    RawTable { headers, rows }
}

/// 指定シートを読む（シートがなければ None）
pub fn read_raw_table(path: &Path, format: TableFormat, sheet: &str) -> Result<Option<RawTable>> {
    let mut workbook = open_sheets(path, format).map_err(|e| table_read_error(path, e))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Ok(None);
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| table_read_error(path, e))?;
    Ok(Some(range_to_table(&range)))
}

/// 全シート名
pub fn sheet_names(path: &Path, format: TableFormat) -> Result<Vec<String>> {
    let workbook = open_sheets(path, format).map_err(|e| table_read_error(path, e))?;
    Ok(workbook.sheet_names().to_vec())
}

/// 1ファイルを読み、閾値でフィルタしたFileResultを返す
///
/// シート・列がないファイルは空のNonStandard結果（エラーではない）。
/// 読めないファイル（破損・形式違い）はTableReadエラー。
pub fn parse_table_file(
    file: &InputFile,
    format: TableFormat,
    threshold: Threshold,
    config: &Config,
) -> Result<FileResult> {
    let table = match read_raw_table(&file.path, format, &config.source_sheet)? {
        Some(table) => table,
        None => {
            return Ok(FileResult::non_standard(
                &file.stem,
                format!("シート '{}' がありません", config.source_sheet),
            ))
        }
    };

    if table.headers.is_empty() {
        return Ok(FileResult::non_standard(
            &file.stem,
            format!("シート '{}' が空です", config.source_sheet),
        ));
    }

    let result = filter_table(&file.stem, table, &config.columns(), threshold.value());
    log::debug!(
        "{}: {}件が閾値 {} 以上",
        file.file_name,
        result.records.len(),
        threshold
    );
    Ok(result)
}
