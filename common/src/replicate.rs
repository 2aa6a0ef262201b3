//! レプリケートグループ
//!
//! 集計ワークブックのシートをグループ化し、化合物名の和集合を作る。
//! 利用可能なシート一覧は `SheetIndex` として明示的に渡す（グローバル状態なし）。

use crate::error::{Error, Result};
use crate::types::{ReplicateGroup, NA};
use std::collections::HashSet;

/// シートとその化合物名
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub name: String,
    pub compounds: Vec<String>,
}

/// 集計ワークブックのシート一覧（ワークブック順）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetIndex {
    sheets: Vec<SheetEntry>,
}

impl SheetIndex {
    pub fn new(sheets: Vec<SheetEntry>) -> Self {
        Self { sheets }
    }

    pub fn names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// カンマ区切りのシート名入力を分解（前後空白除去、空要素は無視）
pub fn parse_members(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// 化合物名の和集合（初出順、重複・空・"NA"を除外）
pub fn union_compounds<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && *name != NA)
        .filter_map(|name| {
            if seen.insert(name.to_string()) {
                Some(name.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// グループを検証して作成
///
/// メンバーに1つでも存在しないシートがあればグループ全体を拒否する。
pub fn build_group(label: &str, members: &[String], sheets: &SheetIndex) -> Result<ReplicateGroup> {
    let label = label.trim();
    if label.is_empty() {
        return Err(Error::InvalidGroup("ラベルが空です".into()));
    }
    if members.is_empty() {
        return Err(Error::InvalidGroup(format!("'{}' にメンバーがありません", label)));
    }

    let missing: Vec<String> = members
        .iter()
        .filter(|m| !sheets.contains(m))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(Error::UnknownSheets {
            label: label.to_string(),
            missing,
        });
    }

    let compounds = union_compounds(
        members
            .iter()
            .filter_map(|m| sheets.get(m))
            .map(|s| s.compounds.as_slice()),
    );

    Ok(ReplicateGroup {
        label: label.to_string(),
        members: members.to_vec(),
        compounds,
    })
}

/// グループ未定義時のフォールバック: 各シートを単独グループにする
pub fn fallback_groups(sheets: &SheetIndex) -> Vec<ReplicateGroup> {
    sheets
        .sheets
        .iter()
        .map(|s| ReplicateGroup {
            label: s.name.clone(),
            members: vec![s.name.clone()],
            compounds: union_compounds(std::iter::once(s.compounds.as_slice())),
        })
        .collect()
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
            SheetEntry { name: "C".into(), compounds: strings(&["w", "NA", "w"]) },
        ])
    }

    #[test]
    fn test_parse_members() {
        assert_eq!(parse_members(" A, B ,,C "), strings(&["A", "B", "C"]));
        assert!(parse_members("  ").is_empty());
    }

    #[test]
    fn test_union_of_two_members() {
        let group = build_group("amostra", &strings(&["A", "B"]), &index()).unwrap();
        let got: HashSet<&str> = group.compounds.iter().map(String::as_str).collect();
        let want: HashSet<&str> = ["x", "y", "z"].into_iter().collect();
        assert_eq!(got, want);
        assert_eq!(group.compounds.len(), 3);
    }

    #[test]
    fn test_group_with_unknown_member_is_rejected() {
        let result = build_group("amostra", &strings(&["A", "Q", "B"]), &index());
        match result {
            Err(Error::UnknownSheets { label, missing }) => {
                assert_eq!(label, "amostra");
                assert_eq!(missing, strings(&["Q"]));
            }
            other => panic!("想定外の結果: {:?}", other),
        }
    }

    #[test]
    fn test_group_requires_label_and_members() {
        assert!(matches!(
            build_group("  ", &strings(&["A"]), &index()),
            Err(Error::InvalidGroup(_))
        ));
        assert!(matches!(
            build_group("amostra", &[], &index()),
            Err(Error::InvalidGroup(_))
        ));
    }

    #[test]
    fn test_union_skips_na_and_duplicates() {
        let group = build_group("c", &strings(&["C"]), &index()).unwrap();
        assert_eq!(group.compounds, strings(&["w"]));
    }

    #[test]
    fn test_union_trims_names() {
        let a = strings(&["Phytol ", " Phytol", "Squalene"]);
        assert_eq!(union_compounds([a.as_slice()]), strings(&["Phytol", "Squalene"]));
    }

    #[test]
    fn test_fallback_groups_one_per_sheet() {
        let groups = fallback_groups(&index());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].label, "A");
        assert_eq!(groups[0].members, strings(&["A"]));
        assert_eq!(groups[0].compounds, strings(&["x", "y"]));
        assert_eq!(groups[1].compounds, strings(&["y", "z"]));
    }
}
