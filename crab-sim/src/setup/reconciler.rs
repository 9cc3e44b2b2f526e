//! Entity reconciliation
//!
//! Guarantees the reference catalog exists exactly once remotely. Each catalog
//! step is gated by the setup store: a completed step is never re-executed
//! unless reset. Steps run in dependency order so that later payloads can
//! resolve earlier entities by name. The `shifts` sweep is not gated and runs
//! on every reconciliation, closing shifts a previous run left open.
//!
//! Idempotency comes from detection, not from remote-side upserts: existing
//! records are listed first, and only standard members whose name is absent
//! are created.

use chrono::Duration;
use crab_client::{EntityType, GatewayError, Record, RemoteEntityGateway, to_payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::ErrorCode;
use shared::models::{
    CategoryCreate, CustomerCreate, DiningTableCreate, DiscountCreate, EmployeeCreate,
    MenuItemCreate, ModifierCreate, ModifierGroupCreate, RoleCreate, Shift, ShiftClose,
    TaxRateCreate,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::SetupStateStore;
use super::standard;
use crate::core::{DetectionPolicy, SimError, SimResult};

/// Stale open shifts are closed this long after clock-in
const STALE_SHIFT_HOURS: i64 = 8;

/// Reconciliation phases, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStep {
    TaxRates,
    Categories,
    ModifierGroups,
    MenuItems,
    Roles,
    Employees,
    Discounts,
    Tables,
    Customers,
    Shifts,
}

impl ReconcileStep {
    pub const ALL: [ReconcileStep; 10] = [
        ReconcileStep::TaxRates,
        ReconcileStep::Categories,
        ReconcileStep::ModifierGroups,
        ReconcileStep::MenuItems,
        ReconcileStep::Roles,
        ReconcileStep::Employees,
        ReconcileStep::Discounts,
        ReconcileStep::Tables,
        ReconcileStep::Customers,
        ReconcileStep::Shifts,
    ];

    /// Step name, also the setup store key
    pub const fn name(self) -> &'static str {
        match self {
            ReconcileStep::TaxRates => "tax_rates",
            ReconcileStep::Categories => "categories",
            ReconcileStep::ModifierGroups => "modifier_groups",
            ReconcileStep::MenuItems => "menu_items",
            ReconcileStep::Roles => "roles",
            ReconcileStep::Employees => "employees",
            ReconcileStep::Discounts => "discounts",
            ReconcileStep::Tables => "tables",
            ReconcileStep::Customers => "customers",
            ReconcileStep::Shifts => "shifts",
        }
    }

    /// Whether a completed run of this step is skipped afterwards
    pub const fn is_gated(self) -> bool {
        !matches!(self, ReconcileStep::Shifts)
    }

    pub const fn entity_type(self) -> EntityType {
        match self {
            ReconcileStep::TaxRates => EntityType::TaxRate,
            ReconcileStep::Categories => EntityType::Category,
            ReconcileStep::ModifierGroups => EntityType::ModifierGroup,
            ReconcileStep::MenuItems => EntityType::MenuItem,
            ReconcileStep::Roles => EntityType::Role,
            ReconcileStep::Employees => EntityType::Employee,
            ReconcileStep::Discounts => EntityType::Discount,
            ReconcileStep::Tables => EntityType::Table,
            ReconcileStep::Customers => EntityType::Customer,
            ReconcileStep::Shifts => EntityType::Shift,
        }
    }

    /// Existing remote count at which nothing is created
    pub const fn sufficiency_threshold(self) -> usize {
        match self {
            ReconcileStep::TaxRates => 1,
            ReconcileStep::Categories => 5,
            ReconcileStep::ModifierGroups => 3,
            ReconcileStep::MenuItems => 10,
            ReconcileStep::Roles => 5,
            ReconcileStep::Employees => 5,
            ReconcileStep::Discounts => 2,
            ReconcileStep::Tables => 4,
            ReconcileStep::Customers => 10,
            ReconcileStep::Shifts => 0,
        }
    }
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one reconciliation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    /// Already completed on a previous run
    pub skipped: bool,
    /// Existing entities recorded instead of created
    pub discovered: u32,
    pub created: u32,
    pub failed: u32,
    /// Stale open shifts closed (shifts step only)
    #[serde(default)]
    pub closed_shifts: u32,
}

impl StepReport {
    fn new(step: ReconcileStep) -> Self {
        Self {
            step: step.name().to_string(),
            ..Default::default()
        }
    }
}

/// Reports of every step of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub steps: Vec<StepReport>,
}

impl ReconcileReport {
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == name)
    }

    pub fn total_created(&self) -> u32 {
        self.steps.iter().map(|s| s.created).sum()
    }

    pub fn total_failed(&self) -> u32 {
        self.steps.iter().map(|s| s.failed).sum()
    }

    /// Every gated step was already complete
    pub fn all_skipped(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.step != ReconcileStep::Shifts.name())
            .all(|s| s.skipped)
    }
}

/// A standard member ready to be created
struct Candidate {
    name: String,
    payload: Value,
}

/// Reference catalog reconciler
pub struct EntityReconciler {
    gateway: Arc<dyn RemoteEntityGateway>,
    store: SetupStateStore,
    policy: DetectionPolicy,
}

impl EntityReconciler {
    pub fn new(
        gateway: Arc<dyn RemoteEntityGateway>,
        store: SetupStateStore,
        policy: DetectionPolicy,
    ) -> Self {
        Self {
            gateway,
            store,
            policy,
        }
    }

    /// Run every step in dependency order
    ///
    /// A fatal step error aborts the run; steps already completed stay marked.
    pub async fn run(&self) -> SimResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        for step in ReconcileStep::ALL {
            let step_report = self.run_step(step).await?;
            report.steps.push(step_report);
        }

        tracing::info!(
            created = report.total_created(),
            failed = report.total_failed(),
            all_skipped = report.all_skipped(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Run a single step, honouring the completion gate
    pub async fn run_step(&self, step: ReconcileStep) -> SimResult<StepReport> {
        let mut report = StepReport::new(step);

        if step.is_gated() && self.store.step_completed(step.name())? {
            tracing::debug!(step = %step, "Step already completed, skipping");
            report.skipped = true;
            return Ok(report);
        }

        if step == ReconcileStep::Shifts {
            self.close_stale_shifts(&mut report).await?;
        } else {
            self.reconcile_catalog(step, &mut report).await?;
        }

        self.store
            .mark_step_completed(step.name(), Some(serde_json::to_value(&report)?))?;

        tracing::info!(
            step = %step,
            discovered = report.discovered,
            created = report.created,
            failed = report.failed,
            closed_shifts = report.closed_shifts,
            "Reconciliation step completed"
        );
        Ok(report)
    }

    /// Forget a step so the next run executes it again
    pub fn reset(&self, step: ReconcileStep) -> SimResult<bool> {
        Ok(self.store.reset_step(step.name())?)
    }

    pub fn reset_all(&self) -> SimResult<()> {
        Ok(self.store.reset_all()?)
    }

    async fn reconcile_catalog(&self, step: ReconcileStep, report: &mut StepReport) -> SimResult<()> {
        let entity_type = step.entity_type();
        let existing = self.detect(step, entity_type).await?;

        let mut known: HashSet<String> = HashSet::new();
        for record in &existing {
            let name = self.record(entity_type, record)?;
            known.insert(name);
            report.discovered += 1;
        }
        if step == ReconcileStep::ModifierGroups && !existing.is_empty() {
            self.discover_modifiers(&existing).await?;
        }

        if existing.len() >= step.sufficiency_threshold() {
            tracing::info!(
                step = %step,
                existing = existing.len(),
                threshold = step.sufficiency_threshold(),
                "Remote catalog sufficient, nothing to create"
            );
            return Ok(());
        }

        for candidate in self.standard_candidates(step)? {
            if known.contains(&candidate.name) {
                continue;
            }
            if self.store.entity_exists(entity_type, &candidate.name)? {
                report.discovered += 1;
                continue;
            }

            match self.gateway.create(entity_type, candidate.payload).await {
                Ok(record) => {
                    self.store
                        .record_entity(entity_type, &record.id, &candidate.name, &record.data)?;
                    report.created += 1;
                    tracing::debug!(step = %step, name = %candidate.name, id = %record.id, "Entity created");

                    if step == ReconcileStep::ModifierGroups {
                        self.create_modifiers(&record.id, &candidate.name).await?;
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        step = %step,
                        name = %candidate.name,
                        code = %ErrorCode::EntityCreateFailed,
                        cause = %e.code(),
                        error = %e,
                        "Entity creation failed, excluded from step"
                    );
                }
            }
        }

        if report.created == 0 && report.discovered == 0 && report.failed > 0 {
            tracing::error!(step = %step, failed = report.failed, "Every creation in step failed");
            return Err(SimError::FatalReconciliation {
                step: step.name().to_string(),
                failed: report.failed,
            });
        }
        Ok(())
    }

    /// List existing remote entities, applying the detection policy on failure
    async fn detect(&self, step: ReconcileStep, entity_type: EntityType) -> SimResult<Vec<Record>> {
        match self.gateway.list_all(entity_type, None).await {
            Ok(records) => Ok(records),
            Err(e) => match self.policy {
                DetectionPolicy::FailOpen => {
                    tracing::warn!(
                        step = %step,
                        error = %e,
                        "Existence check failed, treating as nothing exists"
                    );
                    Ok(Vec::new())
                }
                DetectionPolicy::Strict => Err(SimError::DetectionUnknown {
                    step: step.name().to_string(),
                    source: e,
                }),
            },
        }
    }

    /// Record a remote entity in the store, returning its display name
    fn record(&self, entity_type: EntityType, record: &Record) -> SimResult<String> {
        let name = record.display_name().unwrap_or_else(|| record.id.clone());
        self.store
            .record_entity(entity_type, &record.id, &name, &record.data)?;
        Ok(name)
    }

    /// Record modifiers belonging to already existing groups
    async fn discover_modifiers(&self, groups: &[Record]) -> SimResult<()> {
        let group_ids: HashSet<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        match self.gateway.list_all(EntityType::Modifier, None).await {
            Ok(modifiers) => {
                for modifier in modifiers
                    .iter()
                    .filter(|m| m.str_field("modifier_group_id").is_some_and(|g| group_ids.contains(g)))
                {
                    self.record(EntityType::Modifier, modifier)?;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not list modifiers of existing groups"),
        }
        Ok(())
    }

    /// Create the standard modifiers of a freshly created group
    ///
    /// Individual failures leave the group with fewer modifiers.
    async fn create_modifiers(&self, group_id: &str, group_name: &str) -> SimResult<()> {
        let Some(group) = standard::MODIFIER_GROUPS.iter().find(|g| g.name == group_name) else {
            return Ok(());
        };

        for modifier in group.modifiers {
            let payload = to_payload(&ModifierCreate {
                modifier_group_id: group_id.to_string(),
                name: modifier.name.to_string(),
                price: modifier.price,
            })?;
            match self.gateway.create(EntityType::Modifier, payload).await {
                Ok(record) => {
                    self.store
                        .record_entity(EntityType::Modifier, &record.id, modifier.name, &record.data)?;
                }
                Err(e) => tracing::warn!(
                    group = %group_name,
                    modifier = %modifier.name,
                    error = %e,
                    "Modifier creation failed"
                ),
            }
        }
        Ok(())
    }

    /// Close shifts left open by an interrupted run
    async fn close_stale_shifts(&self, report: &mut StepReport) -> SimResult<()> {
        let records = self.detect(ReconcileStep::Shifts, EntityType::Shift).await?;

        for record in records {
            let shift: Shift = match record.parse() {
                Ok(shift) => shift,
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Unreadable shift record");
                    continue;
                }
            };
            if !shift.is_open() {
                continue;
            }
            report.discovered += 1;

            let close = ShiftClose {
                clock_out: shift.clock_in + Duration::hours(STALE_SHIFT_HOURS),
            };
            match self
                .gateway
                .update(EntityType::Shift, &shift.id, to_payload(&close)?)
                .await
            {
                Ok(_) => report.closed_shifts += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        shift_id = %shift.id,
                        code = %ErrorCode::ShiftFailed,
                        cause = %e.code(),
                        error = %e,
                        "Failed to close stale shift"
                    );
                }
            }
        }
        Ok(())
    }

    /// Standard members of a step with references resolved through the store
    fn standard_candidates(&self, step: ReconcileStep) -> SimResult<Vec<Candidate>> {
        let mut out = Vec::new();
        match step {
            ReconcileStep::TaxRates => {
                for tax in standard::TAX_RATES {
                    out.push(candidate(
                        tax.name,
                        &TaxRateCreate {
                            name: tax.name.to_string(),
                            rate: tax.rate,
                            is_default: tax.is_default,
                        },
                    )?);
                }
            }
            ReconcileStep::Categories => {
                for (i, name) in standard::CATEGORIES.iter().enumerate() {
                    out.push(candidate(
                        name,
                        &CategoryCreate {
                            name: name.to_string(),
                            sort_order: i as i32,
                        },
                    )?);
                }
            }
            ReconcileStep::ModifierGroups => {
                for group in standard::MODIFIER_GROUPS {
                    out.push(candidate(
                        group.name,
                        &ModifierGroupCreate {
                            name: group.name.to_string(),
                        },
                    )?);
                }
            }
            ReconcileStep::MenuItems => {
                for item in standard::MENU_ITEMS {
                    let category_id = self.resolve(EntityType::Category, item.category)?;
                    let modifier_group_ids = self.resolve_all(EntityType::ModifierGroup, item.modifier_groups)?;
                    let tax_rate_ids = self.resolve_all(EntityType::TaxRate, item.tax_rates)?;
                    out.push(candidate(
                        item.name,
                        &MenuItemCreate {
                            name: item.name.to_string(),
                            price: item.price,
                            category_id,
                            modifier_group_ids,
                            tax_rate_ids,
                        },
                    )?);
                }
            }
            ReconcileStep::Roles => {
                for role in standard::ROLES {
                    out.push(candidate(
                        role.name,
                        &RoleCreate {
                            name: role.name.to_string(),
                            description: Some(role.description.to_string()),
                        },
                    )?);
                }
            }
            ReconcileStep::Employees => {
                for employee in standard::EMPLOYEES {
                    out.push(candidate(
                        employee.name,
                        &EmployeeCreate {
                            name: employee.name.to_string(),
                            role_id: self.resolve(EntityType::Role, employee.role)?,
                            pin: employee.pin.to_string(),
                        },
                    )?);
                }
            }
            ReconcileStep::Discounts => {
                for discount in standard::DISCOUNTS {
                    out.push(candidate(
                        discount.name,
                        &DiscountCreate {
                            name: discount.name.to_string(),
                            percentage: discount.percentage,
                            amount: discount.amount,
                        },
                    )?);
                }
            }
            ReconcileStep::Tables => {
                for table in standard::TABLES {
                    out.push(candidate(
                        table.name,
                        &DiningTableCreate {
                            name: table.name.to_string(),
                            capacity: table.capacity,
                        },
                    )?);
                }
            }
            ReconcileStep::Customers => {
                for customer in standard::CUSTOMERS {
                    let name = customer.full_name();
                    let payload = to_payload(&CustomerCreate {
                        first_name: customer.first_name.to_string(),
                        last_name: customer.last_name.to_string(),
                        email: Some(customer.email()),
                        phone: Some(customer.phone.to_string()),
                    })?;
                    out.push(Candidate { name, payload });
                }
            }
            ReconcileStep::Shifts => {}
        }
        Ok(out)
    }

    fn resolve(&self, entity_type: EntityType, name: &str) -> SimResult<Option<String>> {
        let id = self.store.id_by_name(entity_type, name)?;
        if id.is_none() {
            tracing::warn!(entity = %entity_type, name = %name, "Reference not found, omitting");
        }
        Ok(id)
    }

    fn resolve_all(&self, entity_type: EntityType, names: &[&str]) -> SimResult<Vec<String>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            if let Some(id) = self.resolve(entity_type, name)? {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn candidate<T: Serialize>(name: &str, payload: &T) -> Result<Candidate, GatewayError> {
    Ok(Candidate {
        name: name.to_string(),
        payload: to_payload(payload)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crab_client::{FailureKind, MemoryGateway, Operation};
    use serde_json::json;

    fn open_shift_payload(employee_id: &str, clock_in: chrono::NaiveDateTime) -> Value {
        json!({ "employee_id": employee_id, "clock_in": clock_in })
    }

    fn reconciler(gateway: Arc<MemoryGateway>, policy: DetectionPolicy) -> EntityReconciler {
        EntityReconciler::new(gateway, SetupStateStore::open_in_memory().unwrap(), policy)
    }

    #[test]
    fn test_step_order_and_names() {
        let names: Vec<_> = ReconcileStep::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.first(), Some(&"tax_rates"));
        assert_eq!(names.last(), Some(&"shifts"));
        let menu = names.iter().position(|n| *n == "menu_items").unwrap();
        let cats = names.iter().position(|n| *n == "categories").unwrap();
        let groups = names.iter().position(|n| *n == "modifier_groups").unwrap();
        assert!(cats < menu && groups < menu);
        let roles = names.iter().position(|n| *n == "roles").unwrap();
        let employees = names.iter().position(|n| *n == "employees").unwrap();
        assert!(roles < employees);
    }

    #[tokio::test]
    async fn test_creates_standard_set() {
        let gw = Arc::new(MemoryGateway::new());
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);

        let report = rec.run_step(ReconcileStep::TaxRates).await.unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.failed, 0);
        assert!(rec.store.step_completed("tax_rates").unwrap());
        assert_eq!(gw.records(EntityType::TaxRate).len(), 2);
    }

    #[tokio::test]
    async fn test_sufficient_remote_state_creates_nothing() {
        let gw = Arc::new(MemoryGateway::new());
        gw.seed(EntityType::TaxRate, json!({"name": "VAT", "rate": 10, "is_default": true}))
            .unwrap();
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);

        let report = rec.run_step(ReconcileStep::TaxRates).await.unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.created, 0);
        assert_eq!(gw.call_count(EntityType::TaxRate, Operation::Create), 0);
        assert!(rec.store.entity_exists(EntityType::TaxRate, "VAT").unwrap());
    }

    #[tokio::test]
    async fn test_partial_remote_state_fills_missing_names() {
        let gw = Arc::new(MemoryGateway::new());
        gw.seed(EntityType::Role, json!({"name": "Manager"})).unwrap();
        gw.seed(EntityType::Role, json!({"name": "Server"})).unwrap();
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);

        let report = rec.run_step(ReconcileStep::Roles).await.unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(report.created, 3);
        assert_eq!(gw.records(EntityType::Role).len(), 5);
    }

    #[tokio::test]
    async fn test_detection_failure_fail_open_creates() {
        let gw = Arc::new(MemoryGateway::new());
        gw.fail_always(EntityType::Discount, Operation::List, FailureKind::Transient);
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);

        let report = rec.run_step(ReconcileStep::Discounts).await.unwrap();
        assert_eq!(report.created, 4);
    }

    #[tokio::test]
    async fn test_detection_failure_strict_is_retryable() {
        let gw = Arc::new(MemoryGateway::new());
        gw.fail_always(EntityType::Discount, Operation::List, FailureKind::Transient);
        let rec = reconciler(gw.clone(), DetectionPolicy::Strict);

        let err = rec.run_step(ReconcileStep::Discounts).await.unwrap_err();
        assert!(matches!(err, SimError::DetectionUnknown { .. }));
        assert!(err.is_retryable());
        assert!(!rec.store.step_completed("discounts").unwrap());
        assert_eq!(gw.call_count(EntityType::Discount, Operation::Create), 0);
    }

    #[tokio::test]
    async fn test_all_creations_failing_is_fatal() {
        let gw = Arc::new(MemoryGateway::new());
        gw.fail_always(EntityType::Category, Operation::Create, FailureKind::Validation);
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);

        let err = rec.run_step(ReconcileStep::Categories).await.unwrap_err();
        match err {
            SimError::FatalReconciliation { step, failed } => {
                assert_eq!(step, "categories");
                assert_eq!(failed, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!rec.store.step_completed("categories").unwrap());
    }

    #[tokio::test]
    async fn test_menu_items_resolve_references() {
        let gw = Arc::new(MemoryGateway::new());
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);
        for step in [
            ReconcileStep::TaxRates,
            ReconcileStep::Categories,
            ReconcileStep::ModifierGroups,
            ReconcileStep::MenuItems,
        ] {
            rec.run_step(step).await.unwrap();
        }

        let burger = gw
            .records(EntityType::MenuItem)
            .into_iter()
            .find(|r| r.str_field("name") == Some("Classic Burger"))
            .unwrap();
        assert!(burger.str_field("category_id").is_some());
        assert_eq!(burger.data["modifier_group_ids"].as_array().unwrap().len(), 3);
        assert_eq!(burger.data["tax_rate_ids"].as_array().unwrap().len(), 1);

        // 4 + 3 + 3 + 3 + 3 modifiers
        assert_eq!(gw.records(EntityType::Modifier).len(), 16);
    }

    #[tokio::test]
    async fn test_stale_shifts_closed() {
        let gw = Arc::new(MemoryGateway::new());
        let clock_in = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let open = gw
            .seed(EntityType::Shift, open_shift_payload("EM-1", clock_in))
            .unwrap();
        let mut closed = open_shift_payload("EM-2", clock_in);
        closed["clock_out"] = json!(clock_in + Duration::hours(4));
        gw.seed(EntityType::Shift, closed).unwrap();

        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);
        let report = rec.run_step(ReconcileStep::Shifts).await.unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.closed_shifts, 1);

        let shift: Shift = gw.get(EntityType::Shift, &open.id).await.unwrap().parse().unwrap();
        assert_eq!(shift.clock_out, Some(clock_in + Duration::hours(8)));
    }

    #[tokio::test]
    async fn test_shift_sweep_runs_every_time() {
        let gw = Arc::new(MemoryGateway::new());
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);
        let first = rec.run_step(ReconcileStep::Shifts).await.unwrap();
        assert_eq!(first.closed_shifts, 0);
        assert!(rec.store.step_completed("shifts").unwrap());

        let clock_in = chrono::NaiveDate::from_ymd_opt(2024, 5, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        gw.seed(EntityType::Shift, open_shift_payload("EM-3", clock_in))
            .unwrap();

        let second = rec.run_step(ReconcileStep::Shifts).await.unwrap();
        assert!(!second.skipped);
        assert_eq!(second.closed_shifts, 1);
        assert!(
            gw.records(EntityType::Shift)
                .iter()
                .all(|r| r.str_field("clock_out").is_some())
        );
    }

    #[tokio::test]
    async fn test_reset_reexecutes_step() {
        let gw = Arc::new(MemoryGateway::new());
        let rec = reconciler(gw.clone(), DetectionPolicy::FailOpen);
        rec.run_step(ReconcileStep::Tables).await.unwrap();
        assert!(rec.run_step(ReconcileStep::Tables).await.unwrap().skipped);

        assert!(rec.reset(ReconcileStep::Tables).unwrap());
        let again = rec.run_step(ReconcileStep::Tables).await.unwrap();
        assert!(!again.skipped);
        assert_eq!(again.discovered, 12);
        assert_eq!(again.created, 0);
    }
}
