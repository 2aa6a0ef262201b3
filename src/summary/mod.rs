//! 集計ワークブックとレプリケートグループ
//!
//! ## 書き込みフェーズ
//! 解析成功ファイルごとに1シートを追加し、最後に1回保存する。
//!
//! ## グループフェーズ
//! 保存済みワークブックのシート一覧（SheetIndex）に対してグループを検証し、
//! 受理したグループを `replicates.txt` に1行ずつ追記する。

use crate::cli::TableFormat;
use crate::error::{PipelineError, Result};
use crate::table;
use gcms_common::export::summary_core::generate_summary_buffer;
use gcms_common::{
    build_group, fallback_groups, parse_members, replicate_line, FileResult, RawTable,
    ReplicateGroup, ReplicateSet, SheetEntry, SheetIndex, NA,
};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 集計ワークブックを書き出し、割り当てたシート名を返す
pub fn write_summary(results: &[FileResult], output_path: &Path) -> Result<Vec<String>> {
    let buffer = generate_summary_buffer(results).map_err(PipelineError::ExcelGeneration)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, &buffer.data)?;
    Ok(buffer.sheet_names)
}

/// 集計ワークブックの1シートを読む
pub fn read_summary_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    table::read_raw_table(path, TableFormat::Xlsx, sheet)?
        .ok_or_else(|| PipelineError::FileNotFound(format!("{} のシート '{}'", path.display(), sheet)))
}

/// 集計ワークブックを読み戻し、シートごとの化合物名一覧を作る
pub fn read_sheet_index(path: &Path, compound_column: &str) -> Result<SheetIndex> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.display().to_string()));
    }

    let mut sheets = Vec::new();
    for name in table::sheet_names(path, TableFormat::Xlsx)? {
        let raw = read_summary_sheet(path, &name)?;
        let compounds = match raw.headers.iter().position(|h| h == compound_column) {
            Some(idx) => raw
                .rows
                .iter()
                .map(|row| {
                    row.get(idx)
                        .cloned()
                        .flatten()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| NA.to_string())
                })
                .collect(),
            None => {
                log::warn!("シート '{}' に '{}' 列がありません", name, compound_column);
                Vec::new()
            }
        };
        sheets.push(SheetEntry { name, compounds });
    }
    Ok(SheetIndex::new(sheets))
}

/// `ラベル=シート1,シート2` 形式のグループ定義を分解
pub fn parse_group_spec(spec: &str) -> Result<(String, Vec<String>)> {
    let (label, members) = spec.split_once('=').ok_or_else(|| {
        PipelineError::Common(gcms_common::Error::InvalidGroup(format!(
            "'ラベル=シート1,シート2' の形式で指定してください: {}",
            spec
        )))
    })?;
    Ok((label.trim().to_string(), parse_members(members)))
}

/// グループの記録（レポート追記 + メモリ上の集合）
pub struct GroupRecorder {
    report_path: PathBuf,
    groups: Vec<ReplicateGroup>,
}

impl GroupRecorder {
    /// セッション用のレポートファイルを作り直す
    pub fn create(report_path: &Path) -> Result<Self> {
        std::fs::File::create(report_path)?;
        Ok(Self {
            report_path: report_path.to_path_buf(),
            groups: Vec::new(),
        })
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.groups.iter().any(|g| g.label == label.trim())
    }

    /// グループを検証して記録
    ///
    /// 存在しないシートが1つでもあればグループ全体を拒否し、何も書かない。
    pub fn define(&mut self, label: &str, members: &[String], sheets: &SheetIndex) -> Result<&ReplicateGroup> {
        if self.has_label(label) {
            return Err(PipelineError::Common(gcms_common::Error::InvalidGroup(format!(
                "ラベル '{}' は定義済みです",
                label.trim()
            ))));
        }

        let group = build_group(label, members, sheets)?;
        self.append(&group)?;
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    fn append(&self, group: &ReplicateGroup) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_path)?;
        file.write_all(replicate_line(group).as_bytes())?;
        Ok(())
    }

    /// グループ集合を確定（未定義ならシートごとのフォールバック）
    pub fn finish(mut self, sheets: &SheetIndex) -> Result<ReplicateSet> {
        if self.groups.is_empty() {
            log::info!("グループ未定義のため、各シートを単独グループとして扱います");
            for group in fallback_groups(sheets) {
                self.append(&group)?;
                self.groups.push(group);
            }
        }
        Ok(ReplicateSet::new(self.groups))
    }
}

pub fn save_replicate_set(path: &Path, set: &ReplicateSet) -> Result<()> {
    std::fs::write(path, set.to_json()?)?;
    Ok(())
}

pub fn load_replicate_set(path: &Path) -> Result<ReplicateSet> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(ReplicateSet::from_json(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn index() -> SheetIndex {
        SheetIndex::new(vec![
            SheetEntry { name: "A".into(), compounds: strings(&["x", "y"]) },
            SheetEntry { name: "B".into(), compounds: strings(&["y", "z"]) },
        ])
    }

    #[test]
    fn test_parse_group_spec() {
        let (label, members) = parse_group_spec("folha = A, B").unwrap();
        assert_eq!(label, "folha");
        assert_eq!(members, strings(&["A", "B"]));
        assert!(parse_group_spec("folha A,B").is_err());
    }

    #[test]
    fn test_recorder_writes_accepted_groups_only() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("replicates.txt");
        let mut recorder = GroupRecorder::create(&report).unwrap();

        recorder.define("ab", &strings(&["A", "B"]), &index()).unwrap();
        assert!(recorder.define("bad", &strings(&["A", "missing"]), &index()).is_err());
        assert!(recorder.define("ab", &strings(&["A"]), &index()).is_err());

        let set = recorder.finish(&index()).unwrap();
        assert_eq!(set.groups.len(), 1);

        let content = std::fs::read_to_string(&report).unwrap();
        assert_eq!(content, "ab: x|y|z\n");
    }

    #[test]
    fn test_recorder_fallback_when_no_groups() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("replicates.txt");
        let recorder = GroupRecorder::create(&report).unwrap();

        let set = recorder.finish(&index()).unwrap();
        assert_eq!(set.groups.len(), 2);
        assert_eq!(set.groups[0].label, "A");
        assert_eq!(set.groups[1].members, strings(&["B"]));

        let content = std::fs::read_to_string(&report).unwrap();
        assert_eq!(content, "A: x|y\nB: y|z\n");
    }

    #[test]
    fn test_replicate_set_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replicates.json");
        let set = ReplicateSet::new(fallback_groups(&index()));

        save_replicate_set(&path, &set).unwrap();
        assert_eq!(load_replicate_set(&path).unwrap(), set);
    }
}
