use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// PubChem PUG REST のベースURL
pub const PUBCHEM_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 入力ファイルで読むシート
    pub source_sheet: String,
    pub compound_column: String,
    pub confidence_column: String,
    /// 集計ワークブック名（入力フォルダ直下）
    pub summary_file: String,
    pub plots_dir: String,
    pub sdf_dir: String,
    pub replicate_report: String,
    pub replicate_record: String,
    pub lookup_report: String,
    /// グラフに描く上位件数
    pub chart_top_n: usize,
    pub pubchem_base_url: String,
    /// SDFのレコード種別 (2d/3d)
    pub sdf_record_type: String,
    /// 0 = タイムアウトなし
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_sheet: "Summary Report".into(),
            compound_column: "Library Match".into(),
            confidence_column: "Confidence".into(),
            summary_file: "analysis_summary.xlsx".into(),
            plots_dir: "plots".into(),
            sdf_dir: "SDF_files".into(),
            replicate_report: "replicates.txt".into(),
            replicate_record: "replicates.json".into(),
            lookup_report: "smiles_report.txt".into(),
            chart_top_n: 20,
            pubchem_base_url: PUBCHEM_BASE_URL.into(),
            sdf_record_type: "2d".into(),
            timeout_seconds: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PipelineError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("gcms-pipeline").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.chart_top_n == 0 {
            return Err(PipelineError::Config("chart_top_n は1以上にしてください".into()));
        }
        match self.sdf_record_type.as_str() {
            "2d" | "3d" => {}
            other => {
                return Err(PipelineError::Config(format!(
                    "sdf_record_type は 2d/3d のいずれか: {}",
                    other
                )))
            }
        }
        if self.summary_file.trim().is_empty() {
            return Err(PipelineError::Config("summary_file が空です".into()));
        }
        Ok(())
    }

    /// PubChemのベースURL（環境変数を優先）
    pub fn pubchem_url(&self) -> String {
        match std::env::var("GCMS_PUBCHEM_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.pubchem_base_url.clone(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    pub fn columns(&self) -> gcms_common::ColumnSpec {
        gcms_common::ColumnSpec {
            compound_column: self.compound_column.clone(),
            confidence_column: self.confidence_column.clone(),
        }
    }
}
