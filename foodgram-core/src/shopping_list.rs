//! Aggregation of a user's cart into a printable shopping list.

use std::collections::BTreeMap;
use std::fmt;

/// File name offered when the list is downloaded.
pub const FILE_NAME: &str = "shopping_list.txt";

/// Body served instead of an empty file.
pub const EMPTY_LIST_PLACEHOLDER: &str = "Shopping list is empty.";

/// One ingredient row of one recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartIngredient {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl CartIngredient {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i32) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

/// Total amount of one (name, unit) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

impl fmt::Display for ShoppingListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) — {}", self.name, self.measurement_unit, self.total)
    }
}

/// Group rows by (name, unit) and sum their amounts.
///
/// Output is ordered by name (byte-wise, so case-sensitive), then by unit.
/// The same name in two units stays as two entries.
pub fn aggregate<I>(rows: I) -> Vec<ShoppingListEntry>
where
    I: IntoIterator<Item = CartIngredient>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for row in rows {
        *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListEntry {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// One line per entry, or the placeholder when there is nothing to buy.
pub fn render(entries: &[ShoppingListEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_LIST_PLACEHOLDER.to_string();
    }

    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_format() {
        let entry = ShoppingListEntry {
            name: "Salt".to_string(),
            measurement_unit: "g".to_string(),
            total: 15,
        };
        assert_eq!(entry.to_string(), "Salt (g) — 15");
    }

    #[test]
    fn test_units_are_not_merged() {
        let entries = aggregate(vec![
            CartIngredient::new("Milk", "ml", 200),
            CartIngredient::new("Milk", "cup", 1),
            CartIngredient::new("Milk", "ml", 300),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].measurement_unit, "cup");
        assert_eq!(entries[1].total, 500);
    }

    #[test]
    fn test_ordering_is_case_sensitive() {
        let entries = aggregate(vec![
            CartIngredient::new("apple", "pcs", 1),
            CartIngredient::new("Banana", "pcs", 1),
            CartIngredient::new("Apple", "pcs", 1),
        ]);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Banana", "apple"]);
    }

    #[test]
    fn test_totals_do_not_overflow_i32() {
        let rows = (0..3).map(|_| CartIngredient::new("Flour", "g", i32::MAX));
        let entries = aggregate(rows);
        assert_eq!(entries[0].total, 3 * i64::from(i32::MAX));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), EMPTY_LIST_PLACEHOLDER);
    }
}
