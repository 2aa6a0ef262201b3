//! GC-MS Summary Common Library
//!
//! CLIの各ステージで共有される型とユーティリティ（I/Oなし）

pub mod types;
pub mod error;
pub mod filter;
pub mod replicate;
pub mod report;
pub mod naming;
pub mod export;

pub use types::{
    CellValue, CompoundRecord, FileResult, FileStatus, LookupOutcome, ReplicateGroup,
    ReplicateSet, NA,
};
pub use error::{Error, Result};
pub use filter::{filter_records, filter_table, ColumnSpec, RawTable};
pub use replicate::{build_group, fallback_groups, parse_members, union_compounds, SheetEntry, SheetIndex};
pub use report::{lookup_block, lookup_report_header, replicate_line};
pub use naming::{sanitize_file_name, sanitize_sheet_name, unique_file_name, unique_sheet_name};
