//! シート名・ファイル名の正規化

use std::collections::HashSet;

/// Excelシート名の最大長
pub const MAX_SHEET_NAME_LEN: usize = 31;

const SHEET_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const FILE_FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Excelのシート名規則に合わせる（禁止文字を `_` に、31文字以内）
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if SHEET_FORBIDDEN.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// ワークブック内で重複しないシート名を割り当てる
///
/// Excelはシート名を大文字小文字を区別せず比較する。
pub fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!("_{}", n);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

/// ファイル名・ディレクトリ名に使えない文字を `_` に置換
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if FILE_FORBIDDEN.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// 同じフォルダ内で重複しないファイル名を割り当てる
///
/// 正規化後に同じ名前になる場合は後から来た方に `_2`, `_3` ... を付ける。
/// 大文字小文字だけの違いも衝突とみなす。入力順が同じなら結果も同じ。
pub fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let base = sanitize_file_name(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate.to_lowercase()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}
