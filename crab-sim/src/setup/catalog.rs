//! Reference data snapshot used by the workload generators
//!
//! Loaded once per run from the setup store after reconciliation. Entities
//! whose snapshot does not parse into the shared model are skipped with a
//! warning rather than failing the run.

use crab_client::EntityType;
use serde::de::DeserializeOwned;
use shared::models::{
    Category, Customer, DiningTable, Discount, Employee, MenuItem, Modifier, ModifierGroup, Role,
    TaxRate,
};
use std::collections::HashMap;

use super::{SetupStateStore, StorageResult};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tax_rates: Vec<TaxRate>,
    pub categories: Vec<Category>,
    pub modifier_groups: Vec<ModifierGroup>,
    pub menu_items: Vec<MenuItem>,
    pub roles: Vec<Role>,
    pub employees: Vec<Employee>,
    pub discounts: Vec<Discount>,
    pub tables: Vec<DiningTable>,
    pub customers: Vec<Customer>,
}

impl Catalog {
    /// Build the catalog from every entity recorded in the store
    pub fn load(store: &SetupStateStore) -> StorageResult<Self> {
        let mut modifier_groups: Vec<ModifierGroup> = load_typed(store, EntityType::ModifierGroup)?;
        let modifiers: Vec<Modifier> = load_typed(store, EntityType::Modifier)?;

        let mut by_group: HashMap<String, Vec<Modifier>> = HashMap::new();
        for modifier in modifiers {
            by_group
                .entry(modifier.modifier_group_id.clone())
                .or_default()
                .push(modifier);
        }
        for group in &mut modifier_groups {
            if group.modifiers.is_empty()
                && let Some(mods) = by_group.remove(&group.id)
            {
                group.modifiers = mods;
            }
        }

        let catalog = Self {
            tax_rates: load_typed(store, EntityType::TaxRate)?,
            categories: load_typed(store, EntityType::Category)?,
            modifier_groups,
            menu_items: load_typed(store, EntityType::MenuItem)?,
            roles: load_typed(store, EntityType::Role)?,
            employees: load_typed(store, EntityType::Employee)?,
            discounts: load_typed(store, EntityType::Discount)?,
            tables: load_typed(store, EntityType::Table)?,
            customers: load_typed(store, EntityType::Customer)?,
        };

        tracing::info!(
            tax_rates = catalog.tax_rates.len(),
            menu_items = catalog.menu_items.len(),
            employees = catalog.employees.len(),
            tables = catalog.tables.len(),
            customers = catalog.customers.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Tax rates applied to every order
    pub fn default_tax_rates(&self) -> Vec<TaxRate> {
        self.tax_rates.iter().filter(|t| t.is_default).cloned().collect()
    }

    /// Modifiers from the item's eligible groups, in group order
    pub fn modifiers_for(&self, item: &MenuItem) -> Vec<&Modifier> {
        item.modifier_group_ids
            .iter()
            .filter_map(|gid| self.modifier_groups.iter().find(|g| &g.id == gid))
            .flat_map(|g| g.modifiers.iter())
            .collect()
    }
}

fn load_typed<T: DeserializeOwned>(
    store: &SetupStateStore,
    entity_type: EntityType,
) -> StorageResult<Vec<T>> {
    let mut out = Vec::new();
    for entity in store.get_entities(entity_type)? {
        match entity.parse::<T>() {
            Ok(model) => out.push(model),
            Err(e) => tracing::warn!(
                entity = %entity_type,
                remote_id = %entity.remote_id,
                error = %e,
                "Skipping entity with unreadable snapshot"
            ),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_assembles_modifier_groups() {
        let store = SetupStateStore::open_in_memory().unwrap();
        store
            .record_entity(
                EntityType::ModifierGroup,
                "MG-1",
                "Add-ons",
                &json!({"id": "MG-1", "name": "Add-ons"}),
            )
            .unwrap();
        store
            .record_entity(
                EntityType::Modifier,
                "MD-2",
                "Bacon",
                &json!({"id": "MD-2", "name": "Bacon", "price": 200, "modifier_group_id": "MG-1"}),
            )
            .unwrap();
        store
            .record_entity(
                EntityType::MenuItem,
                "IT-3",
                "Classic Burger",
                &json!({"id": "IT-3", "name": "Classic Burger", "price": 1499,
                        "modifier_group_ids": ["MG-1"], "tax_rate_ids": []}),
            )
            .unwrap();
        store
            .record_entity(
                EntityType::TaxRate,
                "TX-4",
                "Sales Tax",
                &json!({"id": "TX-4", "name": "Sales Tax", "rate": 8, "is_default": true}),
            )
            .unwrap();
        store
            .record_entity(
                EntityType::TaxRate,
                "TX-5",
                "Tax Exempt",
                &json!({"id": "TX-5", "name": "Tax Exempt", "rate": 0}),
            )
            .unwrap();

        let catalog = Catalog::load(&store).unwrap();
        assert_eq!(catalog.modifier_groups[0].modifiers.len(), 1);

        let burger = catalog.menu_items.iter().find(|i| i.id == "IT-3").unwrap();
        let mods = catalog.modifiers_for(burger);
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].price, 200);

        let defaults = catalog.default_tax_rates();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].rate, 8);
    }

    #[test]
    fn test_unreadable_snapshot_is_skipped() {
        let store = SetupStateStore::open_in_memory().unwrap();
        store
            .record_entity(EntityType::Table, "TB-1", "Patio", &json!({"id": "TB-1"}))
            .unwrap();
        store
            .record_entity(
                EntityType::Table,
                "TB-2",
                "Table 2",
                &json!({"id": "TB-2", "name": "Table 2", "capacity": 4}),
            )
            .unwrap();

        let catalog = Catalog::load(&store).unwrap();
        assert_eq!(catalog.tables.len(), 1);
        assert_eq!(catalog.tables[0].id, "TB-2");
        assert_eq!(catalog.tables[0].capacity, 4);
    }
}
