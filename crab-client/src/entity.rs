//! Entity types and wire records

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{GatewayError, GatewayResult};

/// Every entity type the remote system exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    // Reference entities
    TaxRate,
    Category,
    ModifierGroup,
    Modifier,
    MenuItem,
    Role,
    Employee,
    Discount,
    Table,
    Customer,
    // Operational entities
    Shift,
    Reservation,
    Order,
    LineItem,
    Modification,
    OrderDiscount,
    ServiceCharge,
    Payment,
    Tip,
    Refund,
}

impl EntityType {
    /// Snake-case name, also the key used in the local state store
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityType::TaxRate => "tax_rate",
            EntityType::Category => "category",
            EntityType::ModifierGroup => "modifier_group",
            EntityType::Modifier => "modifier",
            EntityType::MenuItem => "menu_item",
            EntityType::Role => "role",
            EntityType::Employee => "employee",
            EntityType::Discount => "discount",
            EntityType::Table => "table",
            EntityType::Customer => "customer",
            EntityType::Shift => "shift",
            EntityType::Reservation => "reservation",
            EntityType::Order => "order",
            EntityType::LineItem => "line_item",
            EntityType::Modification => "modification",
            EntityType::OrderDiscount => "order_discount",
            EntityType::ServiceCharge => "service_charge",
            EntityType::Payment => "payment",
            EntityType::Tip => "tip",
            EntityType::Refund => "refund",
        }
    }

    /// REST resource path segment
    pub const fn resource(self) -> &'static str {
        match self {
            EntityType::TaxRate => "tax_rates",
            EntityType::Category => "categories",
            EntityType::ModifierGroup => "modifier_groups",
            EntityType::Modifier => "modifiers",
            EntityType::MenuItem => "items",
            EntityType::Role => "roles",
            EntityType::Employee => "employees",
            EntityType::Discount => "discounts",
            EntityType::Table => "tables",
            EntityType::Customer => "customers",
            EntityType::Shift => "shifts",
            EntityType::Reservation => "reservations",
            EntityType::Order => "orders",
            EntityType::LineItem => "line_items",
            EntityType::Modification => "modifications",
            EntityType::OrderDiscount => "order_discounts",
            EntityType::ServiceCharge => "service_charges",
            EntityType::Payment => "payments",
            EntityType::Tip => "tips",
            EntityType::Refund => "refunds",
        }
    }

    /// Short id prefix used by the in-memory gateway
    pub(crate) const fn id_prefix(self) -> &'static str {
        match self {
            EntityType::TaxRate => "TX",
            EntityType::Category => "CT",
            EntityType::ModifierGroup => "MG",
            EntityType::Modifier => "MD",
            EntityType::MenuItem => "IT",
            EntityType::Role => "RL",
            EntityType::Employee => "EM",
            EntityType::Discount => "DS",
            EntityType::Table => "TB",
            EntityType::Customer => "CU",
            EntityType::Shift => "SH",
            EntityType::Reservation => "RS",
            EntityType::Order => "OR",
            EntityType::LineItem => "LI",
            EntityType::Modification => "MO",
            EntityType::OrderDiscount => "OD",
            EntityType::ServiceCharge => "SC",
            EntityType::Payment => "PY",
            EntityType::Tip => "TP",
            EntityType::Refund => "RF",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote record: the opaque id plus the full JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub data: Value,
}

impl Record {
    /// Build a record from a JSON object carrying an `id` field
    pub fn from_value(data: Value) -> GatewayResult<Self> {
        let id = match data.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(GatewayError::Unexpected(format!(
                    "record without id: {}",
                    data
                )));
            }
        };
        Ok(Self { id, data })
    }

    /// String field accessor
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Integer field accessor
    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// Display name: `name`, or `first_name last_name` for people records
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.str_field("name") {
            return Some(name.to_string());
        }
        match (self.str_field("first_name"), self.str_field("last_name")) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.to_string()),
            _ => None,
        }
    }

    /// Deserialize the JSON object into a typed model
    pub fn parse<T: DeserializeOwned>(&self) -> GatewayResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Equality filter on a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wire form (`field=value`)
    pub fn to_query(&self) -> String {
        format!("{}={}", self.field, self.value)
    }

    /// Whether a JSON object matches this filter
    pub fn matches(&self, data: &Value) -> bool {
        match data.get(&self.field) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            _ => false,
        }
    }
}

/// Paging and filtering for list calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u32,
    pub filter: Option<Filter>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub fn new() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
            filter: None,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_from_value() {
        let rec = Record::from_value(json!({"id": "CT-1", "name": "Drinks"})).unwrap();
        assert_eq!(rec.id, "CT-1");
        assert_eq!(rec.display_name().as_deref(), Some("Drinks"));

        let rec = Record::from_value(json!({"id": 42, "first_name": "Ada", "last_name": "Byron"}))
            .unwrap();
        assert_eq!(rec.id, "42");
        assert_eq!(rec.display_name().as_deref(), Some("Ada Byron"));
    }

    #[test]
    fn test_record_without_id_is_rejected() {
        assert!(Record::from_value(json!({"name": "x"})).is_err());
        assert!(Record::from_value(json!({"id": ""})).is_err());
    }

    #[test]
    fn test_filter_matches() {
        let f = Filter::eq("order_id", "OR-7");
        assert!(f.matches(&json!({"order_id": "OR-7"})));
        assert!(!f.matches(&json!({"order_id": "OR-8"})));
        assert!(!f.matches(&json!({})));
        assert!(Filter::eq("capacity", "4").matches(&json!({"capacity": 4})));
        assert_eq!(f.to_query(), "order_id=OR-7");
    }

    #[test]
    fn test_entity_type_names() {
        assert_eq!(EntityType::ModifierGroup.as_str(), "modifier_group");
        assert_eq!(EntityType::MenuItem.resource(), "items");
        assert_eq!(
            serde_json::to_string(&EntityType::OrderDiscount).unwrap(),
            "\"order_discount\""
        );
    }
}
