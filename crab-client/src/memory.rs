//! In-process system of record
//!
//! Behaves like the remote service for the operations the simulator uses:
//! ids are assigned on create, lists honour paging and equality filters,
//! updates merge fields. Used for dry runs and as the test double.
//!
//! Failure injection lets tests fail the n-th call of an operation on one
//! entity type (or every call) with a chosen error kind.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

use crate::{EntityType, GatewayError, GatewayResult, ListQuery, Record, RemoteEntityGateway};

/// Gateway operation, used for call counting and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// Error produced by an injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Validation,
    Transient,
}

impl FailureKind {
    fn to_error(self, entity: EntityType, op: Operation) -> GatewayError {
        let msg = format!("injected {:?} failure on {} {:?}", self, entity, op);
        match self {
            FailureKind::NotFound => GatewayError::NotFound(msg),
            FailureKind::Validation => GatewayError::Validation(msg),
            FailureKind::Transient => GatewayError::Transient(msg),
        }
    }
}

#[derive(Debug, Clone)]
struct FailureRule {
    entity: EntityType,
    op: Operation,
    /// 1-based call number; None fails every call
    nth: Option<usize>,
    kind: FailureKind,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<EntityType, Vec<Value>>,
    next_id: u64,
    calls: HashMap<(EntityType, Operation), usize>,
    failures: Vec<FailureRule>,
}

impl MemoryState {
    /// Count the call and return the injected failure, if any
    fn enter(&mut self, entity: EntityType, op: Operation) -> GatewayResult<()> {
        let count = self.calls.entry((entity, op)).or_insert(0);
        *count += 1;
        let n = *count;

        let hit = self.failures.iter().find(|rule| {
            rule.entity == entity && rule.op == op && rule.nth.is_none_or(|nth| nth == n)
        });
        match hit {
            Some(rule) => Err(rule.kind.to_error(entity, op)),
            None => Ok(()),
        }
    }

    fn insert(&mut self, entity: EntityType, payload: Value) -> GatewayResult<Record> {
        let Value::Object(mut fields) = payload else {
            return Err(GatewayError::Validation(format!(
                "{} payload must be a JSON object",
                entity
            )));
        };
        self.next_id += 1;
        let id = format!("{}-{}", entity.id_prefix(), self.next_id);
        fields.insert("id".to_string(), Value::String(id));

        let data = Value::Object(fields);
        self.tables.entry(entity).or_default().push(data.clone());
        Record::from_value(data)
    }

    fn position(&self, entity: EntityType, id: &str) -> Option<usize> {
        self.tables.get(&entity)?.iter().position(|v| {
            v.get("id").and_then(Value::as_str) == Some(id)
        })
    }
}

/// In-memory [`RemoteEntityGateway`]
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly (pre-existing remote state); not counted as a call
    pub fn seed(&self, entity: EntityType, payload: Value) -> GatewayResult<Record> {
        self.state.lock().insert(entity, payload)
    }

    /// Fail the `nth` (1-based) call of `op` on `entity`
    pub fn fail_on(&self, entity: EntityType, op: Operation, nth: usize, kind: FailureKind) {
        self.state.lock().failures.push(FailureRule {
            entity,
            op,
            nth: Some(nth),
            kind,
        });
    }

    /// Fail every call of `op` on `entity`
    pub fn fail_always(&self, entity: EntityType, op: Operation, kind: FailureKind) {
        self.state.lock().failures.push(FailureRule {
            entity,
            op,
            nth: None,
            kind,
        });
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Number of calls of `op` on `entity` so far (injected failures included)
    pub fn call_count(&self, entity: EntityType, op: Operation) -> usize {
        self.state
            .lock()
            .calls
            .get(&(entity, op))
            .copied()
            .unwrap_or(0)
    }

    /// Total create calls across every entity type
    pub fn total_creates(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|((_, op), _)| *op == Operation::Create)
            .map(|(_, n)| *n)
            .sum()
    }

    /// Snapshot of all stored records of a type, in creation order
    pub fn records(&self, entity: EntityType) -> Vec<Record> {
        let state = self.state.lock();
        state
            .tables
            .get(&entity)
            .map(|rows| {
                rows.iter()
                    .filter_map(|v| Record::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteEntityGateway for MemoryGateway {
    async fn list(&self, entity: EntityType, query: &ListQuery) -> GatewayResult<Vec<Record>> {
        let mut state = self.state.lock();
        state.enter(entity, Operation::List)?;

        let rows = state.tables.get(&entity).map(Vec::as_slice).unwrap_or(&[]);
        rows.iter()
            .filter(|v| query.filter.as_ref().is_none_or(|f| f.matches(v)))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|v| Record::from_value(v.clone()))
            .collect()
    }

    async fn get(&self, entity: EntityType, id: &str) -> GatewayResult<Record> {
        let mut state = self.state.lock();
        state.enter(entity, Operation::Get)?;

        let idx = state
            .position(entity, id)
            .ok_or_else(|| GatewayError::NotFound(format!("{} {}", entity, id)))?;
        Record::from_value(state.tables[&entity][idx].clone())
    }

    async fn create(&self, entity: EntityType, payload: Value) -> GatewayResult<Record> {
        let mut state = self.state.lock();
        state.enter(entity, Operation::Create)?;
        state.insert(entity, payload)
    }

    async fn update(&self, entity: EntityType, id: &str, payload: Value) -> GatewayResult<Record> {
        let mut state = self.state.lock();
        state.enter(entity, Operation::Update)?;

        let Value::Object(changes) = payload else {
            return Err(GatewayError::Validation(format!(
                "{} update must be a JSON object",
                entity
            )));
        };
        let idx = state
            .position(entity, id)
            .ok_or_else(|| GatewayError::NotFound(format!("{} {}", entity, id)))?;

        let row = state
            .tables
            .get_mut(&entity)
            .and_then(|rows| rows.get_mut(idx))
            .ok_or_else(|| GatewayError::NotFound(format!("{} {}", entity, id)))?;
        if let Value::Object(fields) = row {
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        Record::from_value(row.clone())
    }

    async fn delete(&self, entity: EntityType, id: &str) -> GatewayResult<()> {
        let mut state = self.state.lock();
        state.enter(entity, Operation::Delete)?;

        let idx = state
            .position(entity, id)
            .ok_or_else(|| GatewayError::NotFound(format!("{} {}", entity, id)))?;
        if let Some(rows) = state.tables.get_mut(&entity) {
            rows.remove(idx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Filter;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let gw = MemoryGateway::new();
        let a = gw
            .create(EntityType::Category, json!({"name": "Drinks"}))
            .await
            .unwrap();
        let b = gw
            .create(EntityType::Category, json!({"name": "Sides"}))
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("CT-"));
        assert_eq!(gw.call_count(EntityType::Category, Operation::Create), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_non_object() {
        let gw = MemoryGateway::new();
        let err = gw.create(EntityType::Role, json!("Manager")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_filter_and_paging() {
        let gw = MemoryGateway::new();
        for i in 0..5 {
            let order = if i % 2 == 0 { "OR-1" } else { "OR-2" };
            gw.seed(EntityType::Payment, json!({"order_id": order, "amount": i}))
                .unwrap();
        }

        let q = ListQuery::new().filter(Filter::eq("order_id", "OR-1"));
        assert_eq!(gw.list(EntityType::Payment, &q).await.unwrap().len(), 3);

        let page = gw
            .list(EntityType::Payment, &ListQuery::new().limit(2).offset(4))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);

        let all = gw.list_all(EntityType::Payment, None).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let gw = MemoryGateway::new();
        let rec = gw
            .create(EntityType::Order, json!({"state": "OPEN"}))
            .await
            .unwrap();
        let updated = gw
            .update(EntityType::Order, &rec.id, json!({"total": 1080, "id": "hijack"}))
            .await
            .unwrap();
        assert_eq!(updated.id, rec.id);
        assert_eq!(updated.i64_field("total"), Some(1080));
        assert_eq!(updated.str_field("state"), Some("OPEN"));

        let missing = gw.update(EntityType::Order, "nope", json!({})).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let gw = MemoryGateway::new();
        let rec = gw.create(EntityType::Tip, json!({"amount": 5})).await.unwrap();
        gw.delete(EntityType::Tip, &rec.id).await.unwrap();
        assert!(gw.get(EntityType::Tip, &rec.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_fail_on_nth_call() {
        let gw = MemoryGateway::new();
        gw.fail_on(EntityType::ModifierGroup, Operation::Create, 2, FailureKind::Transient);

        let first = gw.create(EntityType::ModifierGroup, json!({"name": "a"})).await;
        let second = gw.create(EntityType::ModifierGroup, json!({"name": "b"})).await;
        let third = gw.create(EntityType::ModifierGroup, json!({"name": "c"})).await;

        assert!(first.is_ok());
        assert!(second.unwrap_err().is_retryable());
        assert!(third.is_ok());
        assert_eq!(gw.records(EntityType::ModifierGroup).len(), 2);
    }

    #[tokio::test]
    async fn test_fail_always_and_clear() {
        let gw = MemoryGateway::new();
        gw.fail_always(EntityType::TaxRate, Operation::List, FailureKind::Transient);
        assert!(gw.list(EntityType::TaxRate, &ListQuery::new()).await.is_err());
        assert!(gw.list(EntityType::TaxRate, &ListQuery::new()).await.is_err());

        gw.clear_failures();
        assert!(gw.list(EntityType::TaxRate, &ListQuery::new()).await.is_ok());
        assert_eq!(gw.call_count(EntityType::TaxRate, Operation::List), 3);
    }
}
