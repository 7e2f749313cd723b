//! Per-user recipe sets: favorites and the shopping cart.
//!
//! Both are plain (user, recipe) pairs under a unique constraint. Adding uses
//! `ON CONFLICT DO NOTHING` so concurrent duplicates collapse into one row and
//! the affected row count tells the caller whether it was already there.

use std::collections::HashSet;

use diesel::prelude::*;

use crate::models::{NewCartItem, NewFavorite};
use crate::schema::{favorites, shopping_carts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Favorite,
    ShoppingCart,
}

impl Membership {
    /// Human-readable name of the collection, used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Membership::Favorite => "favorites",
            Membership::ShoppingCart => "shopping cart",
        }
    }
}

/// Add a recipe. Returns `false` if it was already present.
pub fn add(conn: &mut PgConnection, kind: Membership, user_id: i32, recipe_id: i32) -> QueryResult<bool> {
    let inserted = match kind {
        Membership::Favorite => diesel::insert_into(favorites::table)
            .values(&NewFavorite { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
        Membership::ShoppingCart => diesel::insert_into(shopping_carts::table)
            .values(&NewCartItem { user_id, recipe_id })
            .on_conflict_do_nothing()
            .execute(conn)?,
    };
    Ok(inserted > 0)
}

/// Remove a recipe. Returns `false` if it was not present.
pub fn remove(conn: &mut PgConnection, kind: Membership, user_id: i32, recipe_id: i32) -> QueryResult<bool> {
    let deleted = match kind {
        Membership::Favorite => diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
        Membership::ShoppingCart => diesel::delete(
            shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .filter(shopping_carts::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
    };
    Ok(deleted > 0)
}

/// Which of `recipe_ids` are in the user's set.
pub fn members_among(
    conn: &mut PgConnection,
    kind: Membership,
    user_id: i32,
    recipe_ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    if recipe_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found: Vec<i32> = match kind {
        Membership::Favorite => favorites::table
            .filter(favorites::user_id.eq(user_id))
            .filter(favorites::recipe_id.eq_any(recipe_ids))
            .select(favorites::recipe_id)
            .load(conn)?,
        Membership::ShoppingCart => shopping_carts::table
            .filter(shopping_carts::user_id.eq(user_id))
            .filter(shopping_carts::recipe_id.eq_any(recipe_ids))
            .select(shopping_carts::recipe_id)
            .load(conn)?,
    };
    Ok(found.into_iter().collect())
}
