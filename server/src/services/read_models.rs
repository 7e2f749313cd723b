//! Response shapes and their batch assembly.
//!
//! Every builder takes a whole page of rows and issues one query per
//! relation, then stitches the results together in memory.

use std::collections::HashMap;

use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Ingredient, Recipe, Tag, User};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use crate::services::memberships::{self, Membership};
use crate::services::{media, subscriptions, users};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagView {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagView {
    fn from(tag: Tag) -> Self {
        TagView {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientView {
    fn from(ingredient: Ingredient) -> Self {
        IngredientView {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// An ingredient as used in one recipe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientView {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the viewer follows this user. Always false for anonymous viewers.
    pub is_subscribed: bool,
    /// Absolute avatar URL
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeMinified {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeMinified {
    pub fn new(recipe: &Recipe, public_url: &str) -> Self {
        RecipeMinified {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media::url(public_url, &recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithRecipes {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeMinified>,
    pub recipes_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<TagView>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Who is looking, and where absolute URLs point.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub viewer: Option<i32>,
    pub public_url: &'a str,
}

fn user_view(user: User, is_subscribed: bool, public_url: &str) -> UserView {
    UserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
        avatar: user.avatar.map(|name| media::url(public_url, &name)),
    }
}

pub fn user_views(conn: &mut PgConnection, list: Vec<User>, ctx: ViewContext) -> QueryResult<Vec<UserView>> {
    let followed = match ctx.viewer {
        Some(viewer) => {
            let ids: Vec<i32> = list.iter().map(|u| u.id).collect();
            subscriptions::followed_among(conn, viewer, &ids)?
        }
        None => Default::default(),
    };

    Ok(list
        .into_iter()
        .map(|user| {
            let is_subscribed = followed.contains(&user.id);
            user_view(user, is_subscribed, ctx.public_url)
        })
        .collect())
}

pub fn single_user_view(conn: &mut PgConnection, user: User, ctx: ViewContext) -> QueryResult<UserView> {
    let mut views = user_views(conn, vec![user], ctx)?;
    views.pop().ok_or(diesel::result::Error::NotFound)
}

/// Users with up to `recipes_limit` of their newest recipes each.
pub fn users_with_recipes(
    conn: &mut PgConnection,
    list: Vec<User>,
    recipes_limit: Option<usize>,
    ctx: ViewContext,
) -> QueryResult<Vec<UserWithRecipes>> {
    let author_ids: Vec<i32> = list.iter().map(|u| u.id).collect();

    let mut by_author: HashMap<i32, Vec<Recipe>> = HashMap::new();
    if !author_ids.is_empty() {
        let rows: Vec<Recipe> = recipes::table
            .filter(recipes::author_id.eq_any(&author_ids))
            .select(Recipe::as_select())
            .order(recipes::id.desc())
            .load(conn)?;
        for recipe in rows {
            by_author.entry(recipe.author_id).or_default().push(recipe);
        }
    }

    let views = user_views(conn, list, ctx)?;
    Ok(views
        .into_iter()
        .map(|user| {
            let authored = by_author.remove(&user.id).unwrap_or_default();
            let recipes_count = authored.len() as i64;
            let shown = recipes_limit.unwrap_or(authored.len());
            UserWithRecipes {
                recipes: authored
                    .iter()
                    .take(shown)
                    .map(|r| RecipeMinified::new(r, ctx.public_url))
                    .collect(),
                recipes_count,
                user,
            }
        })
        .collect())
}

pub fn recipe_views(conn: &mut PgConnection, list: Vec<Recipe>, ctx: ViewContext) -> QueryResult<Vec<RecipeView>> {
    if list.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = list.iter().map(|r| r.id).collect();

    let mut tags_by_recipe: HashMap<i32, Vec<TagView>> = HashMap::new();
    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .order(tags::slug.asc())
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag.into());
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientView>> = HashMap::new();
    let ingredient_rows: Vec<(i32, Ingredient, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .select((
            recipe_ingredients::recipe_id,
            Ingredient::as_select(),
            recipe_ingredients::amount,
        ))
        .order(recipe_ingredients::id.asc())
        .load(conn)?;
    for (recipe_id, ingredient, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientView {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount,
            });
    }

    let (favorited, in_cart) = match ctx.viewer {
        Some(viewer) => (
            memberships::members_among(conn, Membership::Favorite, viewer, &recipe_ids)?,
            memberships::members_among(conn, Membership::ShoppingCart, viewer, &recipe_ids)?,
        ),
        None => Default::default(),
    };

    let mut author_ids: Vec<i32> = list.iter().map(|r| r.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let author_rows = users::find_many(conn, &author_ids)?;
    let authors: HashMap<i32, UserView> = user_views(conn, author_rows, ctx)?
        .into_iter()
        .map(|view| (view.id, view))
        .collect();

    list.into_iter()
        .map(|recipe| {
            let author = authors
                .get(&recipe.author_id)
                .cloned()
                .ok_or(diesel::result::Error::NotFound)?;
            Ok(RecipeView {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author,
                ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                image: media::url(ctx.public_url, &recipe.image),
                name: recipe.name,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect()
}

pub fn single_recipe_view(conn: &mut PgConnection, recipe: Recipe, ctx: ViewContext) -> QueryResult<RecipeView> {
    let mut views = recipe_views(conn, vec![recipe], ctx)?;
    views.pop().ok_or(diesel::result::Error::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(avatar: Option<&str>) -> User {
        User {
            id: 7,
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            password_hash: "$argon2id$...".to_string(),
            avatar: avatar.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_view_hides_password_and_builds_avatar_url() {
        let view = user_view(user(Some("a.png")), true, "http://host");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["avatar"], "http://host/media/a.png");
        assert_eq!(json["is_subscribed"], true);
        assert!(json.get("password_hash").is_none());

        let view = user_view(user(None), false, "http://host");
        assert!(view.avatar.is_none());
    }

    #[test]
    fn test_user_with_recipes_is_flat() {
        let view = UserWithRecipes {
            user: user_view(user(None), true, "http://host"),
            recipes: vec![],
            recipes_count: 3,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["username"], "cook");
        assert_eq!(json["recipes_count"], 3);
        assert!(json.get("user").is_none());
    }
}
