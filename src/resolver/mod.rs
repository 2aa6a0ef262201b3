//! 化合物検索・SDF取得
//!
//! グループごとに `SDF_files/<ラベル>/` を作り、化合物ごとに:
//! 1. 名前で検索し、CID/SMILESをレポートに書く
//! 2. `<化合物名>.sdf` をダウンロード（既存ならスキップ）
//!
//! 1件の失敗でグループ・全体のループは止めない（リトライなし）。

pub mod pubchem;

pub use pubchem::PubChemClient;

use crate::error::Result;
use gcms_common::{
    lookup_block, lookup_report_header, unique_file_name, LookupOutcome, ReplicateGroup,
    ReplicateSet,
};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 検索エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("該当なし")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("想定外のエラー: {0}")]
    Unexpected(String),
}

/// 検索ヒット（先頭の結果）
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundHit {
    pub cid: u64,
    pub smiles: String,
}

/// 化合物データベース
pub trait CompoundSource {
    /// 名前の完全一致で検索（0件は NotFound）
    fn lookup(&self, name: &str) -> std::result::Result<CompoundHit, LookupError>;

    /// 構造ファイル（SDF）を取得
    fn fetch_sdf(&self, name: &str) -> std::result::Result<Vec<u8>, LookupError>;
}

/// SDFダウンロードの結果
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    Saved(PathBuf),
    AlreadyExists,
    NotFound,
    Failed(String),
    /// 検索が成功しなかったため未実行
    NotAttempted,
}

/// 1化合物の処理結果
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundResolution {
    pub name: String,
    pub lookup: LookupOutcome,
    pub download: DownloadStatus,
}

/// 1グループの処理結果
#[derive(Debug, Clone, Default)]
pub struct GroupResolution {
    pub label: String,
    /// SDFの保存先フォルダ
    pub dir: PathBuf,
    pub compounds: Vec<CompoundResolution>,
}

impl GroupResolution {
    pub fn found(&self) -> usize {
        self.compounds
            .iter()
            .filter(|c| matches!(c.lookup, LookupOutcome::Found { .. }))
            .count()
    }

    pub fn downloaded(&self) -> usize {
        self.compounds
            .iter()
            .filter(|c| matches!(c.download, DownloadStatus::Saved(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.compounds
            .iter()
            .filter(|c| !matches!(c.download, DownloadStatus::Saved(_)))
            .count()
    }
}

/// 検索レポート（追記型）
pub struct LookupReport {
    path: PathBuf,
}

impl LookupReport {
    /// ファイルを作り直し、先頭行を書く
    pub fn create(path: &Path) -> Result<Self> {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        std::fs::write(path, lookup_report_header(&generated_at))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn append(&self, name: &str, outcome: &LookupOutcome) {
        let written = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(lookup_block(name, outcome).as_bytes()));
        if let Err(e) = written {
            log::warn!("レポート書き込みエラー ({}): {}", self.path.display(), e);
        }
    }
}

fn download_sdf<S: CompoundSource>(source: &S, name: &str, path: &Path) -> DownloadStatus {
    if path.exists() {
        log::info!("{}: SDFは取得済みのためスキップ ({})", name, path.display());
        return DownloadStatus::AlreadyExists;
    }

    match source.fetch_sdf(name) {
        Ok(bytes) => match std::fs::write(path, bytes) {
            Ok(()) => DownloadStatus::Saved(path.to_path_buf()),
            Err(e) => {
                log::warn!("{}: SDF保存エラー: {}", name, e);
                DownloadStatus::Failed(e.to_string())
            }
        },
        Err(LookupError::NotFound) => {
            log::warn!("{}: SDFが見つかりません", name);
            DownloadStatus::NotFound
        }
        Err(e @ (LookupError::Http { .. } | LookupError::Transport(_))) => {
            log::warn!("{}: SDF取得エラー: {}", name, e);
            DownloadStatus::Failed(e.to_string())
        }
        Err(e) => {
            log::warn!("{}: SDF取得中の想定外のエラー: {}", name, e);
            DownloadStatus::Failed(e.to_string())
        }
    }
}

/// 検索してレポートに書き、ヒットしたときだけSDFを取得する
/// （該当なし・検索エラーのどちらでもダウンロードは試みない）
fn resolve_compound<S: CompoundSource>(
    source: &S,
    name: &str,
    sdf_path: &Path,
    report: &LookupReport,
) -> CompoundResolution {
    let lookup = match source.lookup(name) {
        Ok(hit) => LookupOutcome::Found {
            cid: hit.cid,
            smiles: hit.smiles,
        },
        Err(LookupError::NotFound) => {
            log::warn!("{}: PubChemに該当なし", name);
            LookupOutcome::NotFound
        }
        Err(e) => {
            log::warn!("{}: 検索エラー: {}", name, e);
            LookupOutcome::Error(e.to_string())
        }
    };
    report.append(name, &lookup);

    let download = match lookup {
        LookupOutcome::Found { .. } => download_sdf(source, name, sdf_path),
        _ => DownloadStatus::NotAttempted,
    };

    CompoundResolution {
        name: name.to_string(),
        lookup,
        download,
    }
}

/// 1グループを `group_dir` に処理
///
/// SDFのファイル名はグループ内で一意に割り当てる（`a/b` と `a:b` は
/// `a_b.sdf` と `a_b_2.sdf`）。化合物の並びが同じなら再実行でも同じ名前になる。
pub fn resolve_group<S: CompoundSource>(
    source: &S,
    group: &ReplicateGroup,
    group_dir: &Path,
    report: &LookupReport,
) -> GroupResolution {
    let mut resolution = GroupResolution {
        label: group.label.clone(),
        dir: group_dir.to_path_buf(),
        compounds: Vec::new(),
    };

    if let Err(e) = std::fs::create_dir_all(group_dir) {
        log::warn!("{}: フォルダ作成エラー: {}", group_dir.display(), e);
        return resolution;
    }

    let mut file_names = HashSet::new();
    for (i, name) in group.compounds.iter().enumerate() {
        log::debug!("[{}] {}/{}: {}", group.label, i + 1, group.compounds.len(), name);
        let path = group_dir.join(format!("{}.sdf", unique_file_name(name, &mut file_names)));
        resolution
            .compounds
            .push(resolve_compound(source, name, &path, report));
    }

    resolution
}

/// 全グループを処理
///
/// グループフォルダ名も実行内で一意に割り当てる。
/// エラーになるのはレポートファイルが作れない場合のみ。
pub fn resolve_groups<S: CompoundSource>(
    source: &S,
    set: &ReplicateSet,
    sdf_root: &Path,
    report_path: &Path,
) -> Result<Vec<GroupResolution>> {
    std::fs::create_dir_all(sdf_root)?;
    let report = LookupReport::create(report_path)?;

    let mut dir_names = HashSet::new();
    Ok(set
        .groups
        .iter()
        .map(|group| {
            let group_dir = sdf_root.join(unique_file_name(&group.label, &mut dir_names));
            resolve_group(source, group, &group_dir, &report)
        })
        .collect())
}
