//! Tags and ingredients: the read-only reference data recipes are built from.

use std::collections::HashSet;

use diesel::prelude::*;

use crate::models::{Ingredient, NewIngredient, NewTag, Tag};
use crate::schema::{ingredients, tags};

pub fn list_tags(conn: &mut PgConnection) -> QueryResult<Vec<Tag>> {
    tags::table
        .select(Tag::as_select())
        .order(tags::slug.asc())
        .load(conn)
}

pub fn find_tag(conn: &mut PgConnection, id: i32) -> QueryResult<Option<Tag>> {
    tags::table
        .find(id)
        .select(Tag::as_select())
        .first(conn)
        .optional()
}

/// All ingredients, optionally narrowed to names starting with `prefix`
/// (case-insensitive).
pub fn search_ingredients(
    conn: &mut PgConnection,
    prefix: Option<&str>,
) -> QueryResult<Vec<Ingredient>> {
    let mut query = ingredients::table
        .select(Ingredient::as_select())
        .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
        .into_boxed();

    if let Some(prefix) = prefix.map(str::trim).filter(|p| !p.is_empty()) {
        query = query.filter(ingredients::name.ilike(prefix_pattern(prefix)));
    }

    query.load(conn)
}

pub fn find_ingredient(conn: &mut PgConnection, id: i32) -> QueryResult<Option<Ingredient>> {
    ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(conn)
        .optional()
}

/// Which of `ids` exist as ingredients.
pub fn existing_ingredient_ids(conn: &mut PgConnection, ids: &[i32]) -> QueryResult<HashSet<i32>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found: Vec<i32> = ingredients::table
        .filter(ingredients::id.eq_any(ids))
        .select(ingredients::id)
        .load(conn)?;
    Ok(found.into_iter().collect())
}

/// Which of `ids` exist as tags.
pub fn existing_tag_ids(conn: &mut PgConnection, ids: &[i32]) -> QueryResult<HashSet<i32>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found: Vec<i32> = tags::table
        .filter(tags::id.eq_any(ids))
        .select(tags::id)
        .load(conn)?;
    Ok(found.into_iter().collect())
}

/// Insert ingredients, skipping (name, unit) pairs that already exist.
/// Returns how many rows were added.
pub fn import_ingredients(conn: &mut PgConnection, rows: &[NewIngredient]) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let mut inserted = 0;
        // Keep each statement well under the bind-parameter limit
        for chunk in rows.chunks(1000) {
            inserted += diesel::insert_into(ingredients::table)
                .values(chunk)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        Ok(inserted)
    })
}

/// Insert tags, skipping names or slugs that already exist.
pub fn import_tags(conn: &mut PgConnection, rows: &[NewTag]) -> QueryResult<usize> {
    diesel::insert_into(tags::table)
        .values(rows)
        .on_conflict_do_nothing()
        .execute(conn)
}

/// `ILIKE` pattern matching names that start with `prefix` literally.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("sal"), "sal%");
        assert_eq!(prefix_pattern("100%_"), "100\\%\\_%");
        assert_eq!(prefix_pattern("a\\b"), "a\\\\b%");
    }
}
