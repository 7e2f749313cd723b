use diesel::prelude::*;
use foodgram_core::{aggregate, CartIngredient, ShoppingListEntry};

use crate::schema::{ingredients, recipe_ingredients, shopping_carts};

/// Summed ingredient totals across every recipe in the user's cart.
pub fn build(conn: &mut PgConnection, user_id: i32) -> QueryResult<Vec<ShoppingListEntry>> {
    let rows: Vec<(String, String, i32)> = shopping_carts::table
        .inner_join(
            recipe_ingredients::table
                .on(recipe_ingredients::recipe_id.eq(shopping_carts::recipe_id)),
        )
        .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
        .filter(shopping_carts::user_id.eq(user_id))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;

    Ok(aggregate(
        rows.into_iter()
            .map(|(name, unit, amount)| CartIngredient::new(name, unit, amount)),
    ))
}
