//! 信頼度の横棒グラフ
//!
//! 1ファイル分の上位N件を「化合物名 × Confidence」で描画し、
//! `plots/<ファイル名>.png` に保存する。

use crate::error::{PipelineError, Result};
use gcms_common::{sanitize_file_name, FileResult};
use plotters::prelude::*;
use std::error::Error;
use std::path::{Path, PathBuf};

const BAR_COLOR: RGBColor = RGBColor(0x4C, 0xAF, 0x50);
const WIDTH: u32 = 1400;
const ROW_HEIGHT: u32 = 28;
const MAX_LABEL_CHARS: usize = 48;

/// グラフに描く行（信頼度降順の上位N件）
pub fn chart_rows(result: &FileResult, top_n: usize) -> Vec<(String, f64)> {
    result
        .records
        .iter()
        .take(top_n)
        .map(|r| (truncate_label(&r.library_match), r.confidence.clamp(0.0, 100.0)))
        .collect()
}

fn truncate_label(name: &str) -> String {
    if name.chars().count() <= MAX_LABEL_CHARS {
        name.to_string()
    } else {
        let head: String = name.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{}…", head)
    }
}

pub fn chart_path(plots_dir: &Path, name: &str) -> PathBuf {
    plots_dir.join(format!("{}.png", sanitize_file_name(name)))
}

/// グラフを描画して保存（出力先フォルダは自動作成）
pub fn render_chart(result: &FileResult, plots_dir: &Path, top_n: usize) -> Result<PathBuf> {
    std::fs::create_dir_all(plots_dir)?;
    let path = chart_path(plots_dir, &result.name);
    let rows = chart_rows(result, top_n);
    let title = format!("Top {} compounds by confidence - {}", rows.len(), result.name);

    draw_chart(&path, &title, &rows).map_err(|e| PipelineError::ChartRender(e.to_string()))?;
    Ok(path)
}

fn draw_chart(path: &Path, title: &str, rows: &[(String, f64)]) -> std::result::Result<(), Box<dyn Error>> {
    // 最上段に最高値が来るよう逆順で配置
    let bars: Vec<&(String, f64)> = rows.iter().rev().collect();
    let n = bars.len().max(1) as u32;
    let height = 160 + ROW_HEIGHT * n;

    let root = BitMapBackend::new(path, (WIDTH, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(420)
        .build_cartesian_2d(0f64..100f64, (0u32..n).into_segmented())?;

    let label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|(name, _)| name.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Confidence")
        .y_desc("Library Match")
        .x_labels(11)
        .y_labels(n as usize)
        .y_label_formatter(&label)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, confidence))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(0.0, SegmentValue::Exact(i)), (*confidence, SegmentValue::Exact(i + 1))],
            BAR_COLOR.filled(),
        );
        bar.set_margin(3, 3, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcms_common::{CellValue, CompoundRecord, FileStatus};

    fn result_with(n: usize) -> FileResult {
        FileResult {
            name: "R1".into(),
            headers: vec!["Library Match".into(), "Confidence".into()],
            records: (0..n)
                .map(|i| CompoundRecord {
                    library_match: format!("compound {}", i),
                    confidence: 99.0 - i as f64,
                    cells: vec![CellValue::Text(format!("compound {}", i))],
                })
                .collect(),
            status: FileStatus::Parsed,
        }
    }

    #[test]
    fn test_chart_rows_top_n() {
        let rows = chart_rows(&result_with(30), 20);
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0], ("compound 0".to_string(), 99.0));
        assert_eq!(rows[19].1, 80.0);
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let long = "a".repeat(80);
        let label = truncate_label(&long);
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn test_chart_path() {
        let path = chart_path(Path::new("plots"), "amostra/1");
        assert_eq!(path, PathBuf::from("plots").join("amostra_1.png"));
    }

    /// 描画環境にフォントがあるか（ない環境では描画テストをスキップ）
    fn fonts_available() -> bool {
        let mut buf = vec![0u8; 64 * 16 * 3];
        let root = BitMapBackend::with_buffer(&mut buf, (64, 16)).into_drawing_area();
        let style = TextStyle::from(("sans-serif", 12).into_font());
        root.draw_text("R1", &style, (0, 0)).is_ok()
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "not a PNG: {}", path.display());
    }

    #[test]
    fn test_chart_rows_empty_result() {
        assert!(chart_rows(&result_with(0), 20).is_empty());
    }

    #[test]
    fn test_render_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let plots = dir.path().join("plots");

        if !fonts_available() {
            eprintln!("no fonts available; skipping chart rendering test");
            return;
        }

        let path = render_chart(&result_with(25), &plots, 20).unwrap();
        assert_eq!(path, plots.join("R1.png"));
        assert_png(&path);
    }

    #[test]
    fn test_render_chart_with_zero_rows() {
        let dir = tempfile::tempdir().unwrap();
        let plots = dir.path().join("plots");

        // フォントがなくてもパニックせず、出力フォルダは作られる
        let result = render_chart(&result_with(0), &plots, 20);
        assert!(plots.is_dir());

        if fonts_available() {
            assert_png(&result.unwrap());
        } else {
            assert!(matches!(result, Ok(_) | Err(PipelineError::ChartRender(_))));
        }
    }
}
