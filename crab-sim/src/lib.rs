//! Crab Sim - 餐厅 POS 工作负载模拟器
//!
//! # 架构概述
//!
//! Generates a multi-day restaurant workload against a remote system of
//! record that may already hold part of the catalog:
//!
//! - **对账** (`setup`): idempotent reference entity reconciliation backed by redb
//! - **排班 / 预订** (`shifts`, `reservations`): daily staffing and bookings
//! - **订单** (`orders`): walk-in and reservation orders
//! - **计价** (`order_money`): integer minor-unit valuation
//! - **支付** (`payments`): payments, tips and refunds
//! - **统计** (`analytics`): period roll-up of sealed days
//!
//! # 模块结构
//!
//! ```text
//! crab-sim/src/
//! ├── core/          # 配置、状态、错误
//! ├── setup/         # 对账、标准数据、状态存储
//! ├── orders/        # 订单构建
//! ├── order_money/   # 订单计价
//! ├── payments/      # 支付与退款
//! ├── utils/         # 日志、时间
//! ├── shifts.rs
//! ├── reservations.rs
//! ├── analytics.rs
//! └── simulator.rs
//! ```

pub mod analytics;
pub mod core;
pub mod order_money;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod setup;
pub mod shifts;
pub mod simulator;
pub mod utils;

// Re-export 公共类型
pub use analytics::PeriodAnalyticsAggregator;
pub use core::{
    CountRange, DetectionPolicy, ServiceKind, SimConfig, SimError, SimResult, SimState,
    SimulationProfile,
};
pub use order_money::{Valuation, ValuationError, valuate};
pub use orders::{OrderBatch, OrderBuilder};
pub use payments::{PaymentSettlement, RefundProcessor};
pub use reservations::ReservationGenerator;
pub use setup::{Catalog, EntityReconciler, ReconcileReport, ReconcileStep, SetupStateStore};
pub use shifts::ShiftScheduler;
pub use simulator::{SimulationReport, Simulator};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
