//! 対話セッション
//!
//! フォルダ → 形式 → 閾値 → 解析 → グループ化 → PubChem検索 → 再実行確認。
//! 入力の解釈は純粋関数に分け、ステージ処理は `pipeline` に任せる。

use crate::cli::{TableFormat, Threshold};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::pipeline::{self, AnalyzeRequest, OutputPaths};
use crate::summary::{self, GroupRecorder};
use dialoguer::{Confirm, Input};
use gcms_common::{parse_members, ReplicateSet, SheetIndex};
use std::path::PathBuf;

/// グループ化プロンプトの入力
#[derive(Debug, PartialEq)]
pub enum GroupInput {
    /// メンバーのシート名
    Members(Vec<String>),
    /// 空入力（終了確認へ）
    Done,
}

/// グループ化ループの次の動作
#[derive(Debug, PartialEq)]
pub enum GroupStep {
    /// このメンバーでグループを定義する
    Define(Vec<String>),
    /// グループ化を終える
    Finish,
    /// 終了を取り消して入力に戻る
    Resume,
}

/// 再実行確認の回答
#[derive(Debug, PartialEq)]
pub enum RestartAnswer {
    Restart,
    Exit,
    Unrecognized,
}

/// セッションの終わり方
#[derive(Debug, PartialEq)]
pub enum SessionEnd {
    /// 再実行を断った（終了コード0）
    Declined,
    /// 不明な回答（終了コード1）
    Unrecognized,
}

impl SessionEnd {
    pub fn exit_code(&self) -> u8 {
        match self {
            SessionEnd::Declined => 0,
            SessionEnd::Unrecognized => 1,
        }
    }
}

/// 入力フォルダの検証
pub fn parse_folder(input: &str) -> Result<PathBuf> {
    let path = PathBuf::from(input.trim().trim_matches('"'));
    if input.trim().is_empty() || !path.is_dir() {
        return Err(PipelineError::FolderNotFound(input.trim().to_string()));
    }
    Ok(path)
}

/// 拡張子の検証（大文字小文字・先頭ドットは問わない）
pub fn parse_format(input: &str) -> Result<TableFormat> {
    input
        .parse()
        .map_err(|_| PipelineError::UnsupportedFormat(input.trim().to_string()))
}

pub fn parse_threshold(input: &str) -> Result<Threshold> {
    input.parse().map_err(PipelineError::InvalidThreshold)
}

pub fn parse_group_input(input: &str) -> GroupInput {
    let members = parse_members(input);
    if members.is_empty() {
        GroupInput::Done
    } else {
        GroupInput::Members(members)
    }
}

/// 入力から次の動作を決める
///
/// 空入力のときだけ `confirm` を呼び、断られたら入力に戻る。
pub fn group_step<F>(input: GroupInput, confirm: F) -> Result<GroupStep>
where
    F: FnOnce() -> Result<bool>,
{
    match input {
        GroupInput::Members(members) => Ok(GroupStep::Define(members)),
        GroupInput::Done if confirm()? => Ok(GroupStep::Finish),
        GroupInput::Done => Ok(GroupStep::Resume),
    }
}

pub fn parse_restart(input: &str) -> RestartAnswer {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "sim" => RestartAnswer::Restart,
        "n" | "no" | "nao" | "não" => RestartAnswer::Exit,
        _ => RestartAnswer::Unrecognized,
    }
}

fn prompt_text(prompt: &str, allow_empty: bool) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|e| PipelineError::Prompt(e.to_string()))
}

fn prompt_folder() -> Result<PathBuf> {
    loop {
        let input = prompt_text("GC-MS出力ファイルのフォルダ", false)?;
        match parse_folder(&input) {
            Ok(path) => return Ok(path),
            Err(e) => println!("⚠ {}。もう一度入力してください", e),
        }
    }
}

fn prompt_format() -> Result<TableFormat> {
    loop {
        let input = prompt_text("ファイル形式（例: .xlsx）", false)?;
        match parse_format(&input) {
            Ok(format) => return Ok(format),
            Err(e) => println!("⚠ {}", e),
        }
    }
}

fn prompt_threshold() -> Result<Threshold> {
    loop {
        let input = prompt_text("信頼度の閾値（例: 70, 90, 100）", false)?;
        match parse_threshold(&input) {
            Ok(threshold) => return Ok(threshold),
            Err(e) => println!("⚠ {}", e),
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PipelineError::Prompt(e.to_string()))
}

/// グループ化の対話ループ
fn prompt_groups(sheets: &SheetIndex, recorder: &mut GroupRecorder) -> Result<()> {
    println!("\n📋 レプリケートグループの定義");
    println!("  シート: {}", sheets.names().join(", "));
    println!("  空のまま Enter で終了\n");

    loop {
        let input = prompt_text("メンバーのシート名（カンマ区切り）", true)?;
        let members = match group_step(parse_group_input(&input), || {
            confirm("グループ化を終了しますか?")
        })? {
            GroupStep::Define(members) => members,
            GroupStep::Finish => return Ok(()),
            GroupStep::Resume => continue,
        };

        let label = prompt_text("グループ名", false)?;
        match recorder.define(&label, &members, sheets) {
            Ok(group) => println!("✔ {}: {}化合物\n", group.label, group.compounds.len()),
            Err(e) => println!("⚠ {}。このグループは記録しません\n", e),
        }
    }
}

fn prompt_restart() -> Result<RestartAnswer> {
    let input = prompt_text("もう一度実行しますか? (y/n)", true)?;
    Ok(parse_restart(&input))
}

/// 1回分の処理（解析→グループ化→検索）
fn run_once(request: &AnalyzeRequest, config: &Config) -> Result<()> {
    let paths = OutputPaths::new(&request.folder, config);

    println!("\n[1/3] ファイルを解析中...");
    let outcome = pipeline::analyze(request, config)?;
    if !outcome.skipped.is_empty() {
        println!("  スキップ: {}", outcome.skipped.join(", "));
    }
    let Some(summary_path) = outcome.summary_path else {
        return Ok(());
    };

    println!("\n[2/3] レプリケートグループ");
    let sheets = summary::read_sheet_index(&summary_path, &config.compound_column)?;
    let mut recorder = GroupRecorder::create(&paths.replicate_report)?;
    prompt_groups(&sheets, &mut recorder)?;
    let set: ReplicateSet = recorder.finish(&sheets)?;
    summary::save_replicate_set(&paths.replicate_record, &set)?;
    println!("✔ {}グループを保存: {}", set.groups.len(), paths.replicate_report.display());

    println!("\n[3/3] PubChem検索");
    pipeline::resolve(&set, &request.folder, config)?;
    Ok(())
}

/// 対話セッション
///
/// 再実行を断れば `Declined`、不明な回答なら `Unrecognized` で終わる。
pub fn run_session(config: &Config) -> Result<SessionEnd> {
    loop {
        let folder = prompt_folder()?;
        let format = prompt_format()?;
        let threshold = prompt_threshold()?;
        let request = AnalyzeRequest {
            folder,
            format,
            threshold,
            plots: true,
        };

        match run_once(&request, config) {
            Ok(()) => println!("\n✅ 完了"),
            Err(e @ PipelineError::NoInputFiles(_)) => {
                println!("⚠ {}", e);
                continue;
            }
            Err(e @ PipelineError::Prompt(_)) => return Err(e),
            Err(e) => println!("⚠ {}", e),
        }

        match prompt_restart()? {
            RestartAnswer::Restart => continue,
            RestartAnswer::Exit => return Ok(SessionEnd::Declined),
            RestartAnswer::Unrecognized => return Ok(SessionEnd::Unrecognized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().display().to_string();
        assert_eq!(parse_folder(&input).unwrap(), dir.path());
        assert!(matches!(
            parse_folder("/nonexistent/folder/12345"),
            Err(PipelineError::FolderNotFound(_))
        ));
        assert!(parse_folder("   ").is_err());
    }

    #[test]
    fn test_parse_format_and_threshold() {
        assert_eq!(parse_format("XLSX").unwrap(), TableFormat::Xlsx);
        assert!(matches!(parse_format(".csv"), Err(PipelineError::UnsupportedFormat(_))));
        assert_eq!(parse_threshold(" 90 ").unwrap().value(), 90.0);
        assert!(matches!(parse_threshold("101"), Err(PipelineError::InvalidThreshold(_))));
        assert!(matches!(parse_threshold("setenta"), Err(PipelineError::InvalidThreshold(_))));
    }

    #[test]
    fn test_parse_group_input() {
        assert_eq!(parse_group_input(""), GroupInput::Done);
        assert_eq!(parse_group_input(" , "), GroupInput::Done);
        assert_eq!(
            parse_group_input("R1, R2"),
            GroupInput::Members(vec!["R1".to_string(), "R2".to_string()])
        );
    }

    #[test]
    fn test_group_step_members_skip_confirm() {
        let step = group_step(parse_group_input("R1,R2"), || {
            panic!("メンバー入力では確認しない")
        })
        .unwrap();
        assert_eq!(
            step,
            GroupStep::Define(vec!["R1".to_string(), "R2".to_string()])
        );
    }

    #[test]
    fn test_group_step_empty_input() {
        assert_eq!(group_step(GroupInput::Done, || Ok(true)).unwrap(), GroupStep::Finish);
        assert_eq!(group_step(GroupInput::Done, || Ok(false)).unwrap(), GroupStep::Resume);
        assert!(matches!(
            group_step(GroupInput::Done, || Err(PipelineError::Prompt("closed".into()))),
            Err(PipelineError::Prompt(_))
        ));
    }

    #[test]
    fn test_parse_restart() {
        assert_eq!(parse_restart("y"), RestartAnswer::Restart);
        assert_eq!(parse_restart(" N "), RestartAnswer::Exit);
        assert_eq!(parse_restart("talvez"), RestartAnswer::Unrecognized);
        assert_eq!(parse_restart(""), RestartAnswer::Unrecognized);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(SessionEnd::Declined.exit_code(), 0);
        assert_eq!(SessionEnd::Unrecognized.exit_code(), 1);
    }
}
