//! 核心模块 - 配置、状态和错误定义
//!
//! # 模块结构
//!
//! - [`SimConfig`] / [`SimulationProfile`] - 运行配置与模拟参数
//! - [`SimState`] - 共享资源与服务构造
//! - [`SimError`] - 模拟器错误

pub mod config;
pub mod error;
pub mod state;

pub use config::{CountRange, DetectionPolicy, MAX_SIM_DAYS, SimConfig, SimulationProfile};
pub use error::{SimError, SimResult};
pub use state::{ServiceKind, SimState};
