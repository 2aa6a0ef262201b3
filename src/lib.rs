pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod summary;
pub mod table;
