//! ステージの実行（対話ループから独立）
//!
//! 1. 表フィルタ  2. グラフ  3. 集計ワークブック  4. PubChem検索

use crate::chart;
use crate::cli::{TableFormat, Threshold};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::resolver::{self, GroupResolution, PubChemClient};
use crate::scanner;
use crate::summary;
use crate::table;
use gcms_common::{FileResult, FileStatus, ReplicateSet};
use std::path::{Path, PathBuf};

/// 解析リクエスト
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub folder: PathBuf,
    pub format: TableFormat,
    pub threshold: Threshold,
    pub plots: bool,
}

/// 解析結果
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOutcome {
    pub results: Vec<FileResult>,
    /// 空ファイル・読み込み失敗でスキップしたファイル
    pub skipped: Vec<String>,
    /// 集計ワークブック（解析成功が1件もなければ None）
    pub summary_path: Option<PathBuf>,
    pub sheet_names: Vec<String>,
}

impl AnalyzeOutcome {
    pub fn parsed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_parsed()).count()
    }
}

/// 出力先のパス
pub struct OutputPaths {
    pub summary: PathBuf,
    pub plots: PathBuf,
    pub sdf_root: PathBuf,
    pub replicate_report: PathBuf,
    pub replicate_record: PathBuf,
    pub lookup_report: PathBuf,
}

impl OutputPaths {
    pub fn new(folder: &Path, config: &Config) -> Self {
        Self {
            summary: folder.join(&config.summary_file),
            plots: folder.join(&config.plots_dir),
            sdf_root: folder.join(&config.sdf_dir),
            replicate_report: folder.join(&config.replicate_report),
            replicate_record: folder.join(&config.replicate_record),
            lookup_report: folder.join(&config.lookup_report),
        }
    }
}

/// ステージ1〜3（書き込みフェーズ）
///
/// 1ファイルの失敗は記録してスキップし、全体は止めない。
pub fn analyze(request: &AnalyzeRequest, config: &Config) -> Result<AnalyzeOutcome> {
    let paths = OutputPaths::new(&request.folder, config);

    let files = scanner::scan_folder(&request.folder, request.format, &[config.summary_file.as_str()])?;
    if files.is_empty() {
        return Err(PipelineError::NoInputFiles(format!(
            "{} ({})",
            request.folder.display(),
            request.format
        )));
    }
    println!("✔ {}件のファイルを検出", files.len());

    let mut outcome = AnalyzeOutcome::default();

    for (i, file) in files.iter().enumerate() {
        println!("  [{}/{}] {}", i + 1, files.len(), file.file_name);

        if file.is_empty() {
            log::warn!("{} は空のファイルです。スキップします", file.file_name);
            outcome.skipped.push(file.file_name.clone());
            continue;
        }

        let result = match table::parse_table_file(file, request.format, request.threshold, config) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{}", e);
                outcome.skipped.push(file.file_name.clone());
                continue;
            }
        };

        match &result.status {
            FileStatus::NonStandard(reason) => {
                log::warn!("{} は標準形式ではありません: {}", file.file_name, reason);
            }
            FileStatus::Parsed => {
                println!("    {}件 (閾値 {} 以上)", result.records.len(), request.threshold);
                if request.plots && !result.is_empty() {
                    match chart::render_chart(&result, &paths.plots, config.chart_top_n) {
                        Ok(path) => log::debug!("グラフ出力: {}", path.display()),
                        Err(e) => log::warn!("{}: {}", file.file_name, e),
                    }
                }
            }
        }

        outcome.results.push(result);
    }

    if outcome.parsed_count() == 0 {
        log::warn!("解析できたファイルがないため、集計ワークブックは作成しません");
        return Ok(outcome);
    }

    outcome.sheet_names = summary::write_summary(&outcome.results, &paths.summary)?;
    println!("✔ 集計ワークブック: {}", paths.summary.display());
    outcome.summary_path = Some(paths.summary);

    Ok(outcome)
}

/// ステージ4
pub fn resolve(set: &ReplicateSet, output_dir: &Path, config: &Config) -> Result<Vec<GroupResolution>> {
    let paths = OutputPaths::new(output_dir, config);
    let client = PubChemClient::new(&config.pubchem_url(), &config.sdf_record_type, config.timeout())
        .map_err(|e| PipelineError::Client(e.to_string()))?;

    println!(
        "- PubChem検索中... ({}グループ / {}化合物)",
        set.groups.len(),
        set.compound_count()
    );
    let resolutions = resolver::resolve_groups(&client, set, &paths.sdf_root, &paths.lookup_report)?;
    print_resolution_summary(&resolutions);
    println!("✔ レポート: {}", paths.lookup_report.display());
    println!("✔ SDF出力: {}", paths.sdf_root.display());
    Ok(resolutions)
}

pub fn print_resolution_summary(resolutions: &[GroupResolution]) {
    for r in resolutions {
        println!(
            "  {}: {}化合物 / 検索成功 {} / SDF取得 {} / スキップ {}",
            r.label,
            r.compounds.len(),
            r.found(),
            r.downloaded(),
            r.skipped()
        );
    }
}
