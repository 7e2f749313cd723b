//! Shopping-list aggregation over realistic carts.

use foodgram_core::shopping_list::{
    aggregate, render, CartIngredient, ShoppingListEntry, EMPTY_LIST_PLACEHOLDER,
};

/// Rows as they come out of the cart join: one per (recipe, ingredient).
fn cart_rows(recipes: &[&[(&str, &str, i32)]]) -> Vec<CartIngredient> {
    recipes
        .iter()
        .flat_map(|recipe| recipe.iter())
        .map(|(name, unit, amount)| CartIngredient::new(*name, *unit, *amount))
        .collect()
}

#[test]
fn test_same_ingredient_in_two_recipes_is_summed() {
    let rows = cart_rows(&[
        &[("Salt", "g", 5), ("Potato", "pcs", 4)],
        &[("Salt", "g", 10)],
    ]);

    let entries = aggregate(rows);
    let lines: Vec<String> = entries.iter().map(ToString::to_string).collect();

    assert_eq!(lines, vec!["Potato (pcs) — 4", "Salt (g) — 15"]);
}

#[test]
fn test_render_one_line_per_entry() {
    let rows = cart_rows(&[
        &[("Sugar", "g", 100), ("Eggs", "pcs", 2)],
        &[("Eggs", "pcs", 3), ("Butter", "g", 50)],
    ]);

    let text = render(&aggregate(rows));

    assert_eq!(text, "Butter (g) — 50\nEggs (pcs) — 5\nSugar (g) — 100\n");
}

#[test]
fn test_empty_cart() {
    let entries = aggregate(Vec::new());
    assert!(entries.is_empty());
    assert_eq!(render(&entries), EMPTY_LIST_PLACEHOLDER);
}

#[test]
fn test_entries_serialize_for_json_clients() {
    let entries = aggregate(cart_rows(&[&[("Rice", "g", 200)]]));
    let json = serde_json::to_value(&entries).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "name": "Rice", "measurement_unit": "g", "total": 200 }])
    );
    assert_eq!(
        entries,
        vec![ShoppingListEntry {
            name: "Rice".to_string(),
            measurement_unit: "g".to_string(),
            total: 200,
        }]
    );
}
