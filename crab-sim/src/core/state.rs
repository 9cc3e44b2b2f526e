use std::fmt;
use std::sync::Arc;

use crab_client::{HttpGateway, MemoryCache, MemoryGateway, RemoteEntityGateway};

use crate::analytics::PeriodAnalyticsAggregator;
use crate::core::{SimConfig, SimResult};
use crate::orders::OrderBuilder;
use crate::payments::{PaymentSettlement, RefundProcessor};
use crate::reservations::ReservationGenerator;
use crate::setup::{Catalog, EntityReconciler, SetupStateStore};
use crate::shifts::ShiftScheduler;

/// 服务标识 - 用于日志字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Reconciler,
    ShiftScheduler,
    ReservationGenerator,
    OrderBuilder,
    PaymentSettlement,
    RefundProcessor,
    Analytics,
}

impl ServiceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Reconciler => "reconciler",
            ServiceKind::ShiftScheduler => "shift_scheduler",
            ServiceKind::ReservationGenerator => "reservation_generator",
            ServiceKind::OrderBuilder => "order_builder",
            ServiceKind::PaymentSettlement => "payment_settlement",
            ServiceKind::RefundProcessor => "refund_processor",
            ServiceKind::Analytics => "analytics",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 模拟器状态 - 持有共享资源并构造各服务
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | SimConfig | 配置项 (不可变) |
/// | gateway | Arc<dyn RemoteEntityGateway> | 远端记录系统 |
/// | store | SetupStateStore | redb 对账状态 |
///
/// Services are cheap to build and hold clones of the shared handles; each
/// constructor injects the config values that service needs.
#[derive(Clone)]
pub struct SimState {
    pub config: SimConfig,
    pub gateway: Arc<dyn RemoteEntityGateway>,
    pub store: SetupStateStore,
}

impl SimState {
    pub fn new(
        config: SimConfig,
        gateway: Arc<dyn RemoteEntityGateway>,
        store: SetupStateStore,
    ) -> Self {
        Self {
            config,
            gateway,
            store,
        }
    }

    /// 初始化模拟器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 对账状态库 (work_dir/setup_state.redb)
    /// 3. 网关 (GATEWAY_URL 未设置时使用内存网关)
    pub fn initialize(config: &SimConfig) -> SimResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            crate::core::SimError::Config(format!(
                "cannot create work dir {}: {}",
                config.work_dir.display(),
                e
            ))
        })?;

        let store = SetupStateStore::open(config.state_db_path())?;

        let gateway: Arc<dyn RemoteEntityGateway> = match config.client_config() {
            Some(client) => {
                tracing::info!(base_url = %client.base_url, merchant = %client.merchant_id, "Using remote gateway");
                Arc::new(HttpGateway::new(&client)?.with_cache(Arc::new(MemoryCache::new())))
            }
            None => {
                tracing::warn!("GATEWAY_URL not set, dry run against in-memory gateway");
                Arc::new(MemoryGateway::new())
            }
        };

        Ok(Self::new(config.clone(), gateway, store))
    }

    /// In-memory store and the given gateway
    pub fn in_memory(config: SimConfig, gateway: Arc<dyn RemoteEntityGateway>) -> SimResult<Self> {
        Ok(Self::new(config, gateway, SetupStateStore::open_in_memory()?))
    }

    pub fn gateway(&self) -> Arc<dyn RemoteEntityGateway> {
        self.gateway.clone()
    }

    pub fn store(&self) -> &SetupStateStore {
        &self.store
    }

    // ========== Services ==========

    pub fn reconciler(&self) -> EntityReconciler {
        EntityReconciler::new(
            self.gateway(),
            self.store.clone(),
            self.config.detection_policy,
        )
    }

    pub fn shift_scheduler(&self) -> ShiftScheduler {
        ShiftScheduler::new(self.gateway(), self.config.profile.clone())
    }

    pub fn reservation_generator(&self) -> ReservationGenerator {
        ReservationGenerator::new(self.gateway(), self.config.profile.clone())
    }

    pub fn order_builder(&self, catalog: Arc<Catalog>) -> OrderBuilder {
        OrderBuilder::new(self.gateway(), self.config.profile.clone(), catalog)
    }

    pub fn payment_settlement(&self) -> PaymentSettlement {
        PaymentSettlement::new(self.gateway(), self.config.profile.clone())
    }

    pub fn refund_processor(&self) -> RefundProcessor {
        RefundProcessor::new(self.gateway(), self.config.profile.clone())
    }

    pub fn analytics(&self) -> PeriodAnalyticsAggregator {
        PeriodAnalyticsAggregator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_dry_run_creates_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig::new(dir.path().join("work"));

        let state = SimState::initialize(&config).unwrap();
        assert!(config.state_db_path().exists());
        assert!(state.store().list_steps().unwrap().is_empty());
    }

    #[test]
    fn test_service_kind_names() {
        assert_eq!(ServiceKind::PaymentSettlement.as_str(), "payment_settlement");
        assert_eq!(ServiceKind::Reconciler.to_string(), "reconciler");
    }
}
