use crate::cli::TableFormat;
use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct InputFile {
    pub path: PathBuf,
    pub file_name: String,
    /// 拡張子を除いたファイル名（シート名・グラフ名に使う）
    pub stem: String,
    pub size: u64,
}

impl InputFile {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// 対象ファイル判定
///
/// 拡張子を部分一致で含み、ロックファイル（`~` / `#` を含む名前）ではないもの。
pub fn is_candidate(file_name: &str, format: TableFormat) -> bool {
    let lower = file_name.to_lowercase();
    lower.contains(format.extension()) && !file_name.contains('~') && !file_name.contains('#')
}

/// フォルダ直下の入力ファイルを列挙
///
/// `exclude` に一致するファイル名（集計ワークブック自身など）は除外する。
pub fn scan_folder(folder: &Path, format: TableFormat, exclude: &[&str]) -> Result<Vec<InputFile>> {
    if !folder.is_dir() {
        return Err(PipelineError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !is_candidate(&file_name, format) || exclude.contains(&file_name.as_str()) {
            continue;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name.clone());
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        files.push(InputFile {
            path: path.to_path_buf(),
            file_name,
            stem,
            size,
        });
    }

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_is_candidate() {
        assert!(is_candidate("R1.xlsx", TableFormat::Xlsx));
        assert!(is_candidate("R1.XLSX", TableFormat::Xlsx));
        assert!(!is_candidate("~$R1.xlsx", TableFormat::Xlsx));
        assert!(!is_candidate(".#R1.xlsx", TableFormat::Xlsx));
        assert!(!is_candidate("R1.ods", TableFormat::Xlsx));
        // 部分一致なので .xls は .xlsx にも一致する
        assert!(is_candidate("R1.xlsx", TableFormat::Xls));
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"), TableFormat::Xlsx, &[]);
        assert!(matches!(result, Err(PipelineError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();

        File::create(dir.path().join("R2.xlsx")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("R1.xlsx")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("~$R1.xlsx")).unwrap();
        File::create(dir.path().join("empty.xlsx")).unwrap();
        File::create(dir.path().join("summary.xlsx")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        fs::create_dir(dir.path().join("dir.xlsx")).unwrap();

        let result = scan_folder(dir.path(), TableFormat::Xlsx, &["summary.xlsx"]).unwrap();
        let names: Vec<&str> = result.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["R1.xlsx", "R2.xlsx", "empty.xlsx"]);
        assert_eq!(result[0].stem, "R1");
        assert!(!result[0].is_empty());
        assert!(result[2].is_empty());
    }
}
