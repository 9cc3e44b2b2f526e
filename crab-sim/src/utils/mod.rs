//! 工具模块 - 日志与时间工具

pub mod logger;
pub mod time;

pub use logger::{init_logger, init_logger_with_file};
