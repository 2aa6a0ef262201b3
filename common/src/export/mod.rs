//! Export core modules shared by the CLI.

#[cfg(feature = "excel")]
pub mod summary_core;
