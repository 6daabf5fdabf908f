//! CLI 命令处理

pub mod check_config;
pub mod run;

pub use check_config::*;
pub use run::*;
