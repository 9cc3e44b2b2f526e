use chrono::NaiveDate;
use crab_client::ClientConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::Percent;
use std::path::PathBuf;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use super::{SimError, SimResult};
use crate::utils::time::parse_date;

/// How the reconciler treats a failed existence check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Failed list call means "nothing exists": create the standard set
    #[default]
    FailOpen,
    /// Failed list call aborts the step with a retryable `DetectionUnknown`
    Strict,
}

impl FromStr for DetectionPolicy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_open" | "fail-open" => Ok(DetectionPolicy::FailOpen),
            "strict" => Ok(DetectionPolicy::Strict),
            other => Err(SimError::Config(format!(
                "unknown detection policy '{}', expected fail_open or strict",
                other
            ))),
        }
    }
}

/// Inclusive integer range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Degenerate range, always yields `value`
    pub const fn exactly(value: u32) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

fn validate_count_range(range: &CountRange) -> Result<(), ValidationError> {
    if range.min > range.max {
        return Err(ValidationError::new("empty_range"));
    }
    Ok(())
}

fn validate_percent_range(range: &CountRange) -> Result<(), ValidationError> {
    validate_count_range(range)?;
    if range.max > 100 {
        return Err(ValidationError::new("percent_above_100"));
    }
    Ok(())
}

fn validate_profile(profile: &SimulationProfile) -> Result<(), ValidationError> {
    if profile.staff_fraction_min > profile.staff_fraction_max {
        return Err(ValidationError::new("staff_fraction_range"));
    }
    if profile.reservation_cancel_probability + profile.reservation_no_show_probability > 1.0 {
        return Err(ValidationError::new("reservation_attrition_above_1"));
    }
    Ok(())
}

/// Every probability and range the workload generators draw from
///
/// Injected into each component's constructor; defaults describe a mid-size
/// full-service restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_profile"))]
pub struct SimulationProfile {
    // === Shifts ===
    #[validate(range(min = 0.0, max = 1.0))]
    pub staff_fraction_min: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub staff_fraction_max: f64,
    /// ± minutes applied to shift boundaries
    #[validate(range(max = 240))]
    pub shift_jitter_minutes: u32,

    // === Reservations ===
    #[validate(custom(function = "validate_count_range"))]
    pub reservations_per_day: CountRange,
    #[validate(range(min = 0.0, max = 1.0))]
    pub reservation_cancel_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub reservation_no_show_probability: f64,

    // === Walk-in orders ===
    #[validate(custom(function = "validate_count_range"))]
    pub walk_in_orders_per_day: CountRange,
    #[validate(custom(function = "validate_count_range"))]
    pub line_items_per_order: CountRange,
    #[validate(custom(function = "validate_count_range"))]
    pub item_quantity: CountRange,
    #[validate(range(min = 0.0, max = 1.0))]
    pub customer_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub modifier_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub note_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub discount_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub void_probability: f64,

    // === Reservation orders ===
    #[validate(range(min = 0.0, max = 1.0))]
    pub reservation_modifier_probability: f64,
    #[validate(range(min = 1))]
    pub large_party_size: u32,
    #[validate(range(max = 100))]
    pub large_party_service_pct: Percent,

    // === Payments ===
    #[validate(range(min = 0.0, max = 1.0))]
    pub card_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub tip_probability: f64,
    #[validate(custom(function = "validate_percent_range"))]
    pub tip_percent: CountRange,

    // === Refunds ===
    #[validate(custom(function = "validate_count_range"))]
    pub refunds_per_day: CountRange,
    #[validate(range(min = 0.0, max = 1.0))]
    pub full_refund_probability: f64,
    #[validate(custom(function = "validate_percent_range"))]
    pub partial_refund_percent: CountRange,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            staff_fraction_min: 0.6,
            staff_fraction_max: 0.8,
            shift_jitter_minutes: 60,

            reservations_per_day: CountRange::new(5, 14),
            reservation_cancel_probability: 0.0,
            reservation_no_show_probability: 0.0,

            walk_in_orders_per_day: CountRange::new(15, 24),
            line_items_per_order: CountRange::new(1, 9),
            item_quantity: CountRange::new(1, 3),
            customer_probability: 0.7,
            modifier_probability: 0.3,
            note_probability: 0.2,
            discount_probability: 0.25,
            void_probability: 0.02,

            reservation_modifier_probability: 0.4,
            large_party_size: 6,
            large_party_service_pct: 18,

            card_probability: 0.9,
            tip_probability: 0.8,
            tip_percent: CountRange::new(15, 24),

            refunds_per_day: CountRange::new(0, 3),
            full_refund_probability: 0.7,
            partial_refund_percent: CountRange::new(25, 74),
        }
    }
}

impl SimulationProfile {
    /// Validate and return self
    pub fn validated(self) -> SimResult<Self> {
        self.validate()?;
        Ok(self)
    }
}

/// Maximum number of days a single run may simulate
pub const MAX_SIM_DAYS: u32 = 366;

/// 模拟器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./crab-sim-data | 状态库与日志目录 |
/// | GATEWAY_URL | (unset) | 远端地址; 未设置时使用内存网关 (dry run) |
/// | MERCHANT_ID | demo | 商户路径段 |
/// | API_TOKEN | (unset) | Bearer token |
/// | REQUEST_TIMEOUT_SECS | 30 | HTTP 超时(秒) |
/// | SIM_SEED | 42 | 随机种子 |
/// | SIM_START_DATE | today | 首个模拟日期 (YYYY-MM-DD) |
/// | SIM_DAYS | 7 | 模拟天数 (1..=366) |
/// | DETECTION_POLICY | fail_open | fail_open 或 strict |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
///
/// # 示例
///
/// ```ignore
/// GATEWAY_URL=https://pos.example.com SIM_DAYS=30 cargo run -p crab-sim
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 工作目录，存储状态库和日志
    pub work_dir: PathBuf,
    pub gateway_url: Option<String>,
    pub merchant_id: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub days: u32,
    pub detection_policy: DetectionPolicy,
    pub log_level: String,
    pub log_json: bool,
    pub profile: SimulationProfile,
}

impl SimConfig {
    /// Defaults rooted at `work_dir`, without reading the environment
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            gateway_url: None,
            merchant_id: "demo".into(),
            api_token: None,
            request_timeout_secs: 30,
            seed: 42,
            start_date: chrono::Local::now().date_naive(),
            days: 7,
            detection_policy: DetectionPolicy::default(),
            log_level: "info".into(),
            log_json: false,
            profile: SimulationProfile::default(),
        }
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值; 无法解析的值返回配置错误
    pub fn from_env() -> SimResult<Self> {
        let mut config = Self::new(
            std::env::var("WORK_DIR").unwrap_or_else(|_| "./crab-sim-data".into()),
        );

        config.gateway_url = env_opt("GATEWAY_URL");
        config.api_token = env_opt("API_TOKEN");
        if let Some(merchant) = env_opt("MERCHANT_ID") {
            config.merchant_id = merchant;
        }
        config.request_timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", config.request_timeout_secs)?;
        config.seed = env_parse("SIM_SEED", config.seed)?;
        config.days = env_parse("SIM_DAYS", config.days)?;
        if let Some(date) = env_opt("SIM_START_DATE") {
            config.start_date = parse_date(date.trim())?;
        }
        if let Some(policy) = env_opt("DETECTION_POLICY") {
            config.detection_policy = policy.parse()?;
        }
        if let Some(level) = env_opt("LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_json = env_parse("LOG_JSON", config.log_json)?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints and the simulation profile
    pub fn validate(&self) -> SimResult<()> {
        if !(1..=MAX_SIM_DAYS).contains(&self.days) {
            return Err(SimError::Config(format!(
                "SIM_DAYS must be between 1 and {}, got {}",
                MAX_SIM_DAYS, self.days
            )));
        }
        if self.merchant_id.is_empty() {
            return Err(SimError::Config("MERCHANT_ID must not be empty".into()));
        }
        self.profile.validate()?;
        Ok(())
    }

    /// Path of the redb setup state database
    pub fn state_db_path(&self) -> PathBuf {
        self.work_dir.join("setup_state.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    /// HTTP client settings, None for a dry run
    pub fn client_config(&self) -> Option<ClientConfig> {
        let url = self.gateway_url.as_ref()?;
        let mut client = ClientConfig::new(url.clone(), self.merchant_id.clone())
            .with_timeout(self.request_timeout_secs);
        if let Some(token) = &self.api_token {
            client = client.with_token(token.clone());
        }
        Some(client)
    }

    /// 是否 dry run (无远端网关)
    pub fn is_dry_run(&self) -> bool {
        self.gateway_url.is_none()
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> SimResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SimError::Config(format!("{} '{}' is invalid: {}", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(SimulationProfile::default().validated().is_ok());
    }

    #[test]
    fn test_profile_rejects_bad_probability() {
        let profile = SimulationProfile {
            tip_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(profile.validated(), Err(SimError::Config(_))));
    }

    #[test]
    fn test_profile_rejects_empty_range() {
        let profile = SimulationProfile {
            walk_in_orders_per_day: CountRange::new(10, 2),
            ..Default::default()
        };
        assert!(profile.validated().is_err());

        let profile = SimulationProfile {
            tip_percent: CountRange::new(15, 120),
            ..Default::default()
        };
        assert!(profile.validated().is_err());

        let profile = SimulationProfile {
            staff_fraction_min: 0.9,
            staff_fraction_max: 0.5,
            ..Default::default()
        };
        assert!(profile.validated().is_err());
    }

    #[test]
    fn test_count_range_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = CountRange::new(5, 14);
        for _ in 0..200 {
            assert!(range.contains(range.sample(&mut rng)));
        }
        assert_eq!(CountRange::exactly(3).sample(&mut rng), 3);
    }

    #[test]
    fn test_detection_policy_parse() {
        assert_eq!("strict".parse::<DetectionPolicy>().unwrap(), DetectionPolicy::Strict);
        assert_eq!(
            "FAIL_OPEN".parse::<DetectionPolicy>().unwrap(),
            DetectionPolicy::FailOpen
        );
        assert!("sometimes".parse::<DetectionPolicy>().is_err());
    }

    #[test]
    fn test_config_validate_days() {
        let mut config = SimConfig::new("/tmp/crab-sim");
        assert!(config.validate().is_ok());
        config.days = 0;
        assert!(config.validate().is_err());
        config.days = MAX_SIM_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_only_with_url() {
        let mut config = SimConfig::new("/tmp/crab-sim");
        assert!(config.client_config().is_none());
        assert!(config.is_dry_run());

        config.gateway_url = Some("https://pos.example.com".into());
        config.api_token = Some("secret".into());
        let client = config.client_config().unwrap();
        assert_eq!(client.merchant_id, "demo");
        assert_eq!(client.token.as_deref(), Some("secret"));
        assert_eq!(config.state_db_path(), PathBuf::from("/tmp/crab-sim/setup_state.redb"));
    }
}
