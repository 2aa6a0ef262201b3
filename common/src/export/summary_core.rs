//! 集計ワークブック生成（共通ライブラリ）
//!
//! FileResultごとに1シート。シート名は入力ファイルのベース名。

use crate::naming::unique_sheet_name;
use crate::types::{CellValue, FileResult};
use rust_xlsxwriter::*;
use std::collections::HashSet;

/// 生成結果
pub struct SummaryBuffer {
    pub data: Vec<u8>,
    /// 割り当てたシート名（FileResultと同順）
    pub sheet_names: Vec<String>,
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Text(s) => worksheet.write_string(row, col, s).map(|_| ()),
        CellValue::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b).map(|_| ()),
    }
}

/// 集計ワークブックをバッファに生成
///
/// 解析成功（Parsed）の結果のみシートにする。
pub fn generate_summary_buffer(results: &[FileResult]) -> Result<SummaryBuffer, String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let mut used = HashSet::new();
    let mut sheet_names = Vec::new();

    for result in results.iter().filter(|r| r.is_parsed()) {
        let sheet_name = unique_sheet_name(&result.name, &mut used);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .map_err(|e| format!("シート名設定エラー ({}): {}", sheet_name, e))?;

        for (col, header) in result.headers.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col as u16, header, &header_format)
                .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        }

        for (i, record) in result.records.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, cell) in record.cells.iter().enumerate() {
                write_cell(worksheet, row, col as u16, cell)
                    .map_err(|e| format!("セル書き込みエラー: {}", e))?;
            }
        }

        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;
        worksheet.autofit();

        sheet_names.push(sheet_name);
    }

    let data = workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))?;

    Ok(SummaryBuffer { data, sheet_names })
}
