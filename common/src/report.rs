//! レポート行の整形
//!
//! - レプリケートレポート: `label: name1|name2|...`
//! - 検索レポート: 化合物ごとのブロック（`-----` 区切り）
//!
//! どちらも人が読むための出力で、再パースはしない。

use crate::types::{LookupOutcome, ReplicateGroup};

/// 化合物名の区切り文字（レプリケートレポート）
pub const COMPOUND_DELIMITER: &str = "|";

/// 検索レポートのブロック区切り
pub const BLOCK_SEPARATOR: &str = "-----";

pub const NOT_FOUND_MESSAGE: &str = "Compound not found in PubChem";

/// レプリケートレポートの1行
pub fn replicate_line(group: &ReplicateGroup) -> String {
    format!(
        "{}: {}\n",
        group.label,
        group.compounds.join(COMPOUND_DELIMITER)
    )
}

/// 検索レポートの先頭行
pub fn lookup_report_header(generated_at: &str) -> String {
    format!("PubChem CID/SMILES report - generated {}\n", generated_at)
}

/// 化合物1件分のブロック
pub fn lookup_block(name: &str, outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found { cid, smiles } => {
            format!("{}\nCID: {}\nSMILES: {}\n{}\n", name, cid, smiles, BLOCK_SEPARATOR)
        }
        LookupOutcome::NotFound => {
            format!("{}\n{}\n{}\n", name, NOT_FOUND_MESSAGE, BLOCK_SEPARATOR)
        }
        LookupOutcome::Error(message) => {
            format!("{}\nLookup error: {}\n{}\n", name, message, BLOCK_SEPARATOR)
        }
    }
}
