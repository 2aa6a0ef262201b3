//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// レプリケートグループに存在しないシートが含まれる
    #[error("Unknown sheet(s) in group '{label}': {}", missing.join(", "))]
    UnknownSheets { label: String, missing: Vec<String> },

    #[error("Invalid group: {0}")]
    InvalidGroup(String),

    #[error("Unsupported record version: {0}")]
    UnsupportedVersion(u32),

    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_unknown_sheets() {
        let error = Error::UnknownSheets {
            label: "amostra1".to_string(),
            missing: vec!["R9".to_string(), "R10".to_string()],
        };
        assert_eq!(
            format!("{}", error),
            "Unknown sheet(s) in group 'amostra1': R9, R10"
        );
    }

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("設定ファイルが見つかりません".to_string());
        let display = format!("{}", error);
        assert_eq!(display, "Config error: 設定ファイルが見つかりません");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
