//! Recipe composition: the recipe row plus its ingredient and tag associations.
//!
//! Association rows are never diffed. A submitted list replaces the stored one
//! wholesale (delete, then insert) inside the same transaction as the recipe
//! row, so readers see either the old set or the new set.

use diesel::dsl::not;
use diesel::pg::Pg;
use diesel::prelude::*;
use foodgram_core::{IngredientAmount, RecipeChanges, RecipeDraft};

use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe, RecipeChangeset};
use crate::schema::{favorites, recipe_ingredients, recipe_tags, recipes, shopping_carts, tags};
use crate::services::media;

pub fn find(conn: &mut PgConnection, id: i32) -> QueryResult<Option<Recipe>> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()
}

pub fn exists(conn: &mut PgConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(recipes::table.find(id))).get_result(conn)
}

/// Insert a validated recipe with all of its associations.
pub fn create(conn: &mut PgConnection, author_id: i32, draft: &RecipeDraft) -> QueryResult<Recipe> {
    conn.transaction(|conn| {
        let image = media::store(conn, &draft.image)?;

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id,
                name: &draft.name,
                image: &image,
                text: &draft.text,
                cooking_time: draft.cooking_time,
            })
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        insert_ingredients(conn, recipe.id, &draft.ingredients)?;
        insert_tags(conn, recipe.id, &draft.tags)?;

        tracing::info!(
            recipe_id = recipe.id,
            author_id,
            ingredients = draft.ingredients.len(),
            tags = draft.tags.len(),
            "recipe created"
        );

        Ok(recipe)
    })
}

/// Apply a validated partial update.
///
/// Submitted lists replace the stored associations; omitted lists are left
/// untouched. A replaced image is dropped from media storage. The recipe row
/// is re-read under `FOR UPDATE`, so concurrent edits apply one after the other.
pub fn update(conn: &mut PgConnection, recipe_id: i32, changes: &RecipeChanges) -> QueryResult<Recipe> {
    conn.transaction(|conn| {
        let recipe: Recipe = recipes::table
            .find(recipe_id)
            .select(Recipe::as_select())
            .for_update()
            .first(conn)?;

        let new_image = changes
            .image
            .as_ref()
            .map(|image| media::store(conn, image))
            .transpose()?;

        let updated = if changes.touches_recipe_row() {
            diesel::update(recipes::table.find(recipe.id))
                .set(&RecipeChangeset {
                    name: changes.name.as_deref(),
                    image: new_image.as_deref(),
                    text: changes.text.as_deref(),
                    cooking_time: changes.cooking_time,
                })
                .returning(Recipe::as_returning())
                .get_result(conn)?
        } else {
            recipe.clone()
        };

        if new_image.is_some() {
            media::delete(conn, &recipe.image)?;
        }

        if let Some(items) = &changes.ingredients {
            replace_ingredients(conn, recipe.id, items)?;
        }
        if let Some(tag_ids) = &changes.tags {
            replace_tags(conn, recipe.id, tag_ids)?;
        }

        tracing::info!(
            recipe_id = recipe.id,
            ingredients_replaced = changes.ingredients.is_some(),
            tags_replaced = changes.tags.is_some(),
            "recipe updated"
        );

        Ok(updated)
    })
}

/// Delete a recipe; associations, favorites, cart rows and its short link
/// go with it through `ON DELETE CASCADE`.
pub fn delete(conn: &mut PgConnection, recipe_id: i32) -> QueryResult<()> {
    conn.transaction(|conn| {
        let image: String = diesel::delete(recipes::table.find(recipe_id))
            .returning(recipes::image)
            .get_result(conn)?;
        media::delete(conn, &image)?;
        tracing::info!(recipe_id, "recipe deleted");
        Ok(())
    })
}

pub fn replace_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    items: &[IngredientAmount],
) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    insert_ingredients(conn, recipe_id, items)
}

pub fn replace_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    insert_tags(conn, recipe_id, tag_ids)
}

fn insert_ingredients(
    conn: &mut PgConnection,
    recipe_id: i32,
    items: &[IngredientAmount],
) -> QueryResult<()> {
    let rows: Vec<NewRecipeIngredient> = items
        .iter()
        .map(|item| NewRecipeIngredient {
            recipe_id,
            ingredient_id: item.id,
            amount: item.amount,
        })
        .collect();

    diesel::insert_into(recipe_ingredients::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn insert_tags(conn: &mut PgConnection, recipe_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    let rows: Vec<NewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| NewRecipeTag { recipe_id, tag_id })
        .collect();

    diesel::insert_into(recipe_tags::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

/// Filters accepted by the recipe list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// Match recipes carrying any of these tag slugs.
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeFilter {
    /// Parse from a raw query string. `tags` may repeat; unknown keys and
    /// unparsable values are ignored.
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let mut filter = RecipeFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "author" => filter.author = value.parse().ok(),
                "tags" if !value.is_empty() => filter.tags.push(value),
                "is_favorited" => filter.is_favorited = parse_flag(&value),
                "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(&value),
                _ => {}
            }
        }
        filter
    }

    /// Whether the filter can only match nothing for this viewer.
    fn is_empty_for(&self, viewer: Option<i32>) -> bool {
        viewer.is_none()
            && (self.is_favorited == Some(true) || self.is_in_shopping_cart == Some(true))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn filtered<'a>(filter: &'a RecipeFilter, viewer: Option<i32>) -> recipes::BoxedQuery<'a, Pg> {
    let mut query = recipes::table.into_boxed();

    if let Some(author) = filter.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if !filter.tags.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(&filter.tags))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }

    // Anonymous viewers have neither favorites nor a cart: "=1" is handled by
    // the caller, "=0" matches everything.
    if let Some(user_id) = viewer {
        if let Some(flag) = filter.is_favorited {
            let favorited = favorites::table
                .filter(favorites::user_id.eq(user_id))
                .select(favorites::recipe_id);
            query = if flag {
                query.filter(recipes::id.eq_any(favorited))
            } else {
                query.filter(not(recipes::id.eq_any(favorited)))
            };
        }
        if let Some(flag) = filter.is_in_shopping_cart {
            let in_cart = shopping_carts::table
                .filter(shopping_carts::user_id.eq(user_id))
                .select(shopping_carts::recipe_id);
            query = if flag {
                query.filter(recipes::id.eq_any(in_cart))
            } else {
                query.filter(not(recipes::id.eq_any(in_cart)))
            };
        }
    }

    query
}

/// One page of recipes, newest first, plus the total match count.
pub fn list(
    conn: &mut PgConnection,
    filter: &RecipeFilter,
    viewer: Option<i32>,
    limit: i64,
    offset: i64,
) -> QueryResult<(Vec<Recipe>, i64)> {
    if filter.is_empty_for(viewer) {
        return Ok((Vec::new(), 0));
    }

    let count: i64 = filtered(filter, viewer).count().get_result(conn)?;

    let page = filtered(filter, viewer)
        .select(Recipe::as_select())
        .order(recipes::id.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    Ok((page, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn stored_ingredients(conn: &mut PgConnection, recipe_id: i32) -> Vec<(i32, i32)> {
        recipe_ingredients::table
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .select((recipe_ingredients::ingredient_id, recipe_ingredients::amount))
            .order(recipe_ingredients::ingredient_id.asc())
            .load(conn)
            .unwrap()
    }

    fn stored_tags(conn: &mut PgConnection, recipe_id: i32) -> Vec<i32> {
        recipe_tags::table
            .filter(recipe_tags::recipe_id.eq(recipe_id))
            .select(recipe_tags::tag_id)
            .order(recipe_tags::tag_id.asc())
            .load(conn)
            .unwrap()
    }

    #[test]
    fn test_create_stores_every_association() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let author = test_support::user(&mut conn);
        let flour = test_support::ingredient(&mut conn, "g");
        let water = test_support::ingredient(&mut conn, "ml");
        let lunch = test_support::tag(&mut conn);
        let draft = test_support::draft(
            vec![
                IngredientAmount { id: flour.id, amount: 500 },
                IngredientAmount { id: water.id, amount: 300 },
            ],
            vec![lunch.id],
        );

        let recipe = create(&mut conn, author.id, &draft).unwrap();

        assert_eq!(recipe.author_id, author.id);
        assert_eq!(
            stored_ingredients(&mut conn, recipe.id),
            vec![(flour.id, 500), (water.id, 300)]
        );
        assert_eq!(stored_tags(&mut conn, recipe.id), vec![lunch.id]);
        assert!(media::find(&mut conn, &recipe.image).unwrap().is_some());
    }

    #[test]
    fn test_tags_only_update_keeps_ingredients() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let author = test_support::user(&mut conn);
        let recipe = test_support::recipe(&mut conn, author.id);
        let before = stored_ingredients(&mut conn, recipe.id);
        let dinner = test_support::tag(&mut conn);
        let snack = test_support::tag(&mut conn);

        let changes = RecipeChanges {
            tags: Some(vec![dinner.id, snack.id]),
            ..Default::default()
        };
        let updated = update(&mut conn, recipe.id, &changes).unwrap();

        assert_eq!(updated.name, recipe.name);
        assert_eq!(updated.image, recipe.image);
        assert_eq!(stored_ingredients(&mut conn, recipe.id), before);
        let mut expected = vec![dinner.id, snack.id];
        expected.sort_unstable();
        assert_eq!(stored_tags(&mut conn, recipe.id), expected);
    }

    #[test]
    fn test_ingredients_update_replaces_wholesale() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let author = test_support::user(&mut conn);
        let recipe = test_support::recipe(&mut conn, author.id);
        let tags_before = stored_tags(&mut conn, recipe.id);
        let salt = test_support::ingredient(&mut conn, "pinch");

        let changes = RecipeChanges {
            ingredients: Some(vec![IngredientAmount { id: salt.id, amount: 2 }]),
            ..Default::default()
        };
        update(&mut conn, recipe.id, &changes).unwrap();

        assert_eq!(stored_ingredients(&mut conn, recipe.id), vec![(salt.id, 2)]);
        assert_eq!(stored_tags(&mut conn, recipe.id), tags_before);
    }

    #[test]
    fn test_image_update_drops_previous_blob() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let author = test_support::user(&mut conn);
        let recipe = test_support::recipe(&mut conn, author.id);

        let changes = RecipeChanges {
            image: Some(test_support::png()),
            ..Default::default()
        };
        let updated = update(&mut conn, recipe.id, &changes).unwrap();

        assert_ne!(updated.image, recipe.image);
        assert!(media::find(&mut conn, &recipe.image).unwrap().is_none());
        assert!(media::find(&mut conn, &updated.image).unwrap().is_some());
    }

    #[test]
    fn test_delete_removes_recipe_and_image() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let author = test_support::user(&mut conn);
        let recipe = test_support::recipe(&mut conn, author.id);

        delete(&mut conn, recipe.id).unwrap();

        assert!(find(&mut conn, recipe.id).unwrap().is_none());
        assert!(stored_tags(&mut conn, recipe.id).is_empty());
        assert!(media::find(&mut conn, &recipe.image).unwrap().is_none());
    }

    #[test]
    fn test_filter_from_query() {
        let filter = RecipeFilter::from_query(Some(
            "page=2&limit=6&tags=breakfast&tags=lunch&author=3&is_favorited=1&is_in_shopping_cart=0",
        ));
        assert_eq!(
            filter,
            RecipeFilter {
                author: Some(3),
                tags: vec!["breakfast".to_string(), "lunch".to_string()],
                is_favorited: Some(true),
                is_in_shopping_cart: Some(false),
            }
        );
    }

    #[test]
    fn test_filter_ignores_garbage() {
        let filter = RecipeFilter::from_query(Some("author=abc&is_favorited=maybe&tags="));
        assert_eq!(filter, RecipeFilter::default());
        assert_eq!(RecipeFilter::from_query(None), RecipeFilter::default());
    }

    #[test]
    fn test_anonymous_flags() {
        let only_favorites = RecipeFilter {
            is_favorited: Some(true),
            ..Default::default()
        };
        assert!(only_favorites.is_empty_for(None));
        assert!(!only_favorites.is_empty_for(Some(1)));

        let not_in_cart = RecipeFilter {
            is_in_shopping_cart: Some(false),
            ..Default::default()
        };
        assert!(!not_in_cart.is_empty_for(None));
    }
}
