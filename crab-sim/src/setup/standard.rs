//! Standard reference data created when the remote catalog is insufficient
//!
//! References between sets (menu item → category, employee → role, ...) are
//! by name and resolved through the setup store at creation time.

use shared::{Cents, Percent};

pub struct StandardTaxRate {
    pub name: &'static str,
    pub rate: Percent,
    pub is_default: bool,
}

pub struct StandardModifier {
    pub name: &'static str,
    pub price: Cents,
}

pub struct StandardModifierGroup {
    pub name: &'static str,
    pub modifiers: &'static [StandardModifier],
}

pub struct StandardMenuItem {
    pub name: &'static str,
    pub price: Cents,
    pub category: &'static str,
    pub modifier_groups: &'static [&'static str],
    pub tax_rates: &'static [&'static str],
}

pub struct StandardRole {
    pub name: &'static str,
    pub description: &'static str,
}

pub struct StandardEmployee {
    pub name: &'static str,
    pub role: &'static str,
    pub pin: &'static str,
}

/// Percentage or fixed amount (negative magnitude)
pub struct StandardDiscount {
    pub name: &'static str,
    pub percentage: Option<Percent>,
    pub amount: Option<Cents>,
}

pub struct StandardTable {
    pub name: &'static str,
    pub capacity: u32,
}

pub struct StandardCustomer {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub phone: &'static str,
}

impl StandardCustomer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> String {
        format!(
            "{}.{}@example.com",
            self.first_name.to_lowercase(),
            self.last_name.to_lowercase()
        )
    }
}

pub const SALES_TAX: &str = "Sales Tax";

pub const TAX_RATES: &[StandardTaxRate] = &[
    StandardTaxRate { name: SALES_TAX, rate: 8, is_default: true },
    StandardTaxRate { name: "Tax Exempt", rate: 0, is_default: false },
];

pub const CATEGORIES: &[&str] = &[
    "Appetizers",
    "Salads",
    "Entrees",
    "Pasta",
    "Sides",
    "Desserts",
    "Beverages",
];

pub const MODIFIER_GROUPS: &[StandardModifierGroup] = &[
    StandardModifierGroup {
        name: "Cooking Temperature",
        modifiers: &[
            StandardModifier { name: "Rare", price: 0 },
            StandardModifier { name: "Medium Rare", price: 0 },
            StandardModifier { name: "Medium", price: 0 },
            StandardModifier { name: "Well Done", price: 0 },
        ],
    },
    StandardModifierGroup {
        name: "Add-ons",
        modifiers: &[
            StandardModifier { name: "Extra Cheese", price: 150 },
            StandardModifier { name: "Bacon", price: 200 },
            StandardModifier { name: "Avocado", price: 250 },
        ],
    },
    StandardModifierGroup {
        name: "Dressing",
        modifiers: &[
            StandardModifier { name: "Ranch", price: 0 },
            StandardModifier { name: "Balsamic Vinaigrette", price: 0 },
            StandardModifier { name: "Blue Cheese", price: 75 },
        ],
    },
    StandardModifierGroup {
        name: "Side Choice",
        modifiers: &[
            StandardModifier { name: "Fries", price: 0 },
            StandardModifier { name: "Side Salad", price: 100 },
            StandardModifier { name: "Sweet Potato Fries", price: 150 },
        ],
    },
    StandardModifierGroup {
        name: "Drink Size",
        modifiers: &[
            StandardModifier { name: "Small", price: 0 },
            StandardModifier { name: "Regular", price: 50 },
            StandardModifier { name: "Large", price: 100 },
        ],
    },
];

const TAXED: &[&str] = &[SALES_TAX];

pub const MENU_ITEMS: &[StandardMenuItem] = &[
    StandardMenuItem { name: "Buffalo Wings", price: 1299, category: "Appetizers", modifier_groups: &["Dressing"], tax_rates: TAXED },
    StandardMenuItem { name: "Mozzarella Sticks", price: 899, category: "Appetizers", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Loaded Nachos", price: 1099, category: "Appetizers", modifier_groups: &["Add-ons"], tax_rates: TAXED },
    StandardMenuItem { name: "Caesar Salad", price: 999, category: "Salads", modifier_groups: &["Add-ons"], tax_rates: TAXED },
    StandardMenuItem { name: "House Salad", price: 799, category: "Salads", modifier_groups: &["Dressing"], tax_rates: TAXED },
    StandardMenuItem { name: "Ribeye Steak", price: 3299, category: "Entrees", modifier_groups: &["Cooking Temperature", "Side Choice"], tax_rates: TAXED },
    StandardMenuItem { name: "Classic Burger", price: 1499, category: "Entrees", modifier_groups: &["Cooking Temperature", "Add-ons", "Side Choice"], tax_rates: TAXED },
    StandardMenuItem { name: "Grilled Salmon", price: 2499, category: "Entrees", modifier_groups: &["Side Choice"], tax_rates: TAXED },
    StandardMenuItem { name: "Chicken Sandwich", price: 1399, category: "Entrees", modifier_groups: &["Add-ons", "Side Choice"], tax_rates: TAXED },
    StandardMenuItem { name: "Fish Tacos", price: 1599, category: "Entrees", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Spaghetti Carbonara", price: 1699, category: "Pasta", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Fettuccine Alfredo", price: 1599, category: "Pasta", modifier_groups: &["Add-ons"], tax_rates: TAXED },
    StandardMenuItem { name: "French Fries", price: 599, category: "Sides", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Onion Rings", price: 699, category: "Sides", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Chocolate Lava Cake", price: 899, category: "Desserts", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "New York Cheesecake", price: 799, category: "Desserts", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "Soft Drink", price: 600, category: "Beverages", modifier_groups: &["Drink Size"], tax_rates: TAXED },
    StandardMenuItem { name: "Iced Tea", price: 600, category: "Beverages", modifier_groups: &["Drink Size"], tax_rates: TAXED },
    StandardMenuItem { name: "Craft Beer", price: 799, category: "Beverages", modifier_groups: &[], tax_rates: TAXED },
    StandardMenuItem { name: "House Wine", price: 999, category: "Beverages", modifier_groups: &[], tax_rates: TAXED },
];

pub const ROLES: &[StandardRole] = &[
    StandardRole { name: "Manager", description: "Runs the floor, approves voids and refunds" },
    StandardRole { name: "Server", description: "Takes orders and settles checks" },
    StandardRole { name: "Bartender", description: "Bar service and drink orders" },
    StandardRole { name: "Host", description: "Seating and reservations" },
    StandardRole { name: "Cook", description: "Kitchen line" },
];

pub const EMPLOYEES: &[StandardEmployee] = &[
    StandardEmployee { name: "Maria Lopez", role: "Manager", pin: "1001" },
    StandardEmployee { name: "James Carter", role: "Server", pin: "1002" },
    StandardEmployee { name: "Aisha Khan", role: "Server", pin: "1003" },
    StandardEmployee { name: "Tom Becker", role: "Server", pin: "1004" },
    StandardEmployee { name: "Lena Fischer", role: "Bartender", pin: "1005" },
    StandardEmployee { name: "Diego Santos", role: "Host", pin: "1006" },
    StandardEmployee { name: "Kenji Sato", role: "Cook", pin: "1007" },
    StandardEmployee { name: "Grace Okafor", role: "Server", pin: "1008" },
];

pub const DISCOUNTS: &[StandardDiscount] = &[
    StandardDiscount { name: "Happy Hour", percentage: Some(10), amount: None },
    StandardDiscount { name: "Employee Meal", percentage: Some(20), amount: None },
    StandardDiscount { name: "Loyalty Reward", percentage: None, amount: Some(-500) },
    StandardDiscount { name: "Coupon", percentage: None, amount: Some(-300) },
];

pub const TABLES: &[StandardTable] = &[
    StandardTable { name: "Table 1", capacity: 2 },
    StandardTable { name: "Table 2", capacity: 2 },
    StandardTable { name: "Table 3", capacity: 2 },
    StandardTable { name: "Table 4", capacity: 4 },
    StandardTable { name: "Table 5", capacity: 4 },
    StandardTable { name: "Table 6", capacity: 4 },
    StandardTable { name: "Table 7", capacity: 4 },
    StandardTable { name: "Table 8", capacity: 6 },
    StandardTable { name: "Table 9", capacity: 6 },
    StandardTable { name: "Table 10", capacity: 6 },
    StandardTable { name: "Booth 1", capacity: 8 },
    StandardTable { name: "Booth 2", capacity: 8 },
];

pub const CUSTOMERS: &[StandardCustomer] = &[
    StandardCustomer { first_name: "Olivia", last_name: "Bennett", phone: "555-0101" },
    StandardCustomer { first_name: "Liam", last_name: "Nguyen", phone: "555-0102" },
    StandardCustomer { first_name: "Emma", last_name: "Rossi", phone: "555-0103" },
    StandardCustomer { first_name: "Noah", last_name: "Schmidt", phone: "555-0104" },
    StandardCustomer { first_name: "Ava", last_name: "Patel", phone: "555-0105" },
    StandardCustomer { first_name: "Ethan", last_name: "Kim", phone: "555-0106" },
    StandardCustomer { first_name: "Sophia", last_name: "Garcia", phone: "555-0107" },
    StandardCustomer { first_name: "Mason", last_name: "Clarke", phone: "555-0108" },
    StandardCustomer { first_name: "Isabella", last_name: "Moreau", phone: "555-0109" },
    StandardCustomer { first_name: "Lucas", last_name: "Silva", phone: "555-0110" },
    StandardCustomer { first_name: "Mia", last_name: "Johansson", phone: "555-0111" },
    StandardCustomer { first_name: "Oliver", last_name: "Wright", phone: "555-0112" },
    StandardCustomer { first_name: "Amelia", last_name: "Hughes", phone: "555-0113" },
    StandardCustomer { first_name: "Elijah", last_name: "Brooks", phone: "555-0114" },
    StandardCustomer { first_name: "Harper", last_name: "Dubois", phone: "555-0115" },
    StandardCustomer { first_name: "Benjamin", last_name: "Ortiz", phone: "555-0116" },
    StandardCustomer { first_name: "Evelyn", last_name: "Murphy", phone: "555-0117" },
    StandardCustomer { first_name: "Henry", last_name: "Adeyemi", phone: "555-0118" },
    StandardCustomer { first_name: "Chloe", last_name: "Larsen", phone: "555-0119" },
    StandardCustomer { first_name: "Daniel", last_name: "Costa", phone: "555-0120" },
];

/// Free-text notes attached to walk-in line items
pub const LINE_ITEM_NOTES: &[&str] = &[
    "No onions",
    "Allergy: peanuts",
    "Dressing on the side",
    "Extra napkins",
    "Gluten free if possible",
    "Birthday, bring a candle",
];

/// Reasons recorded on refunds
pub const REFUND_REASONS: &[&str] = &[
    "Customer complaint",
    "Wrong order",
    "Food quality",
    "Long wait time",
    "Duplicate charge",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_set_sizes() {
        assert_eq!(TAX_RATES.len(), 2);
        assert_eq!(CATEGORIES.len(), 7);
        assert_eq!(MODIFIER_GROUPS.len(), 5);
        assert_eq!(MENU_ITEMS.len(), 20);
        assert_eq!(ROLES.len(), 5);
        assert_eq!(EMPLOYEES.len(), 8);
        assert_eq!(DISCOUNTS.len(), 4);
        assert_eq!(TABLES.len(), 12);
        assert_eq!(CUSTOMERS.len(), 20);
    }

    #[test]
    fn test_references_resolve_by_name() {
        let categories: HashSet<_> = CATEGORIES.iter().copied().collect();
        let groups: HashSet<_> = MODIFIER_GROUPS.iter().map(|g| g.name).collect();
        let taxes: HashSet<_> = TAX_RATES.iter().map(|t| t.name).collect();
        for item in MENU_ITEMS {
            assert!(categories.contains(item.category), "{}", item.name);
            assert!(item.modifier_groups.iter().all(|g| groups.contains(g)), "{}", item.name);
            assert!(item.tax_rates.iter().all(|t| taxes.contains(t)), "{}", item.name);
        }

        let roles: HashSet<_> = ROLES.iter().map(|r| r.name).collect();
        assert!(EMPLOYEES.iter().all(|e| roles.contains(e.role)));
    }

    #[test]
    fn test_fixed_discounts_never_exceed_cheapest_item() {
        let cheapest = MENU_ITEMS.iter().map(|i| i.price).min().unwrap();
        for discount in DISCOUNTS {
            assert!(discount.percentage.is_some() != discount.amount.is_some());
            if let Some(amount) = discount.amount {
                assert!(amount < 0);
                assert!(amount.abs() < cheapest);
            }
        }
    }

    #[test]
    fn test_names_unique() {
        let names: HashSet<_> = CUSTOMERS.iter().map(|c| c.full_name()).collect();
        assert_eq!(names.len(), CUSTOMERS.len());
        let tables: HashSet<_> = TABLES.iter().map(|t| t.name).collect();
        assert_eq!(tables.len(), TABLES.len());
        assert!(EMPLOYEES.iter().all(|e| e.pin.len() == 4));
    }
}
