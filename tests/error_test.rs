//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use gcms_pipeline::cli::TableFormat;
use gcms_pipeline::error::PipelineError;
use gcms_pipeline::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), TableFormat::Xlsx, &[]);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::FolderNotFound(_)));
}

/// 対象形式のファイルがないフォルダ
#[test]
fn test_scan_folder_no_tables() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path(), TableFormat::Xlsx, &[]);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// PipelineErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PipelineError::Config("テスト設定エラー".to_string()),
        PipelineError::FileNotFound("R1.xlsx".to_string()),
        PipelineError::FolderNotFound("/path/to/folder".to_string()),
        PipelineError::UnsupportedFormat(".csv".to_string()),
        PipelineError::InvalidThreshold("150".to_string()),
        PipelineError::NoInputFiles("フォルダ".to_string()),
        PipelineError::TableRead {
            file: "R1.xlsx".to_string(),
            message: "invalid zip".to_string(),
        },
        PipelineError::ExcelGeneration("Excel生成エラー".to_string()),
        PipelineError::ChartRender("font not found".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 未対応形式のメッセージに対応形式が含まれる
#[test]
fn test_unsupported_format_message() {
    let err = PipelineError::UnsupportedFormat(".csv".to_string());
    let display = format!("{}", err);

    assert!(display.contains(".csv"));
    assert!(display.contains(".xlsx"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: PipelineError = io_err.into();

    assert!(matches!(err, PipelineError::Io(_)));
    let display = format!("{}", err);
    assert!(display.contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: PipelineError = json_err.into();

    assert!(matches!(err, PipelineError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = gcms_common::Error::UnknownSheets {
        label: "folha".to_string(),
        missing: vec!["R9".to_string()],
    };
    let err: PipelineError = common_err.into();

    assert!(matches!(err, PipelineError::Common(_)));
    // 透過的エラーなのでメッセージがそのまま表示される
    assert_eq!(format!("{}", err), "Unknown sheet(s) in group 'folha': R9");
}
