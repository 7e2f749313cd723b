//! End-to-end checks of recipe submissions against a known catalogue.

use std::collections::HashSet;

use foodgram_core::validation::{
    INGREDIENTS_NOT_FOUND, INGREDIENTS_REPEAT, TAGS_NOT_FOUND, TAGS_REPEAT,
};
use foodgram_core::{
    validate_new_recipe, validate_recipe_changes, Catalog, IngredientAmount, RecipeInput,
};

const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

struct Fixture {
    ingredients: HashSet<i32>,
    tags: HashSet<i32>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            ingredients: (1..=5).collect(),
            tags: (1..=3).collect(),
        }
    }

    fn catalog(&self) -> Catalog<'_> {
        Catalog {
            ingredient_ids: &self.ingredients,
            tag_ids: &self.tags,
        }
    }
}

fn submission(ingredients: &[(i32, i32)], tags: &[i32]) -> RecipeInput {
    RecipeInput {
        name: Some("Pancakes".to_string()),
        text: Some("Mix and fry.".to_string()),
        cooking_time: Some(20),
        image: Some(PNG_URI.to_string()),
        ingredients: Some(
            ingredients
                .iter()
                .map(|&(id, amount)| IngredientAmount { id, amount })
                .collect(),
        ),
        tags: Some(tags.to_vec()),
    }
}

#[test]
fn test_unique_submission_keeps_every_association() {
    let fixture = Fixture::new();
    let draft =
        validate_new_recipe(submission(&[(1, 200), (2, 2), (3, 1)], &[1, 2]), &fixture.catalog())
            .unwrap();
    assert_eq!(draft.ingredients.len(), 3);
    assert_eq!(draft.tags.len(), 2);
}

#[test]
fn test_duplicate_ingredient_is_rejected() {
    let fixture = Fixture::new();
    let errors = validate_new_recipe(submission(&[(1, 200), (1, 5)], &[1]), &fixture.catalog())
        .unwrap_err();
    assert!(errors.contains("ingredients", INGREDIENTS_REPEAT));
    assert!(errors.get("tags").is_none());
}

#[test]
fn test_all_violations_are_collected() {
    let fixture = Fixture::new();
    let mut input = submission(&[(1, 1), (1, 1), (42, 1)], &[2, 2, 9]);
    input.cooking_time = Some(0);

    let errors = validate_new_recipe(input, &fixture.catalog()).unwrap_err();

    assert!(errors.contains("ingredients", INGREDIENTS_REPEAT));
    assert!(errors.contains("ingredients", INGREDIENTS_NOT_FOUND));
    assert!(errors.contains("tags", TAGS_REPEAT));
    assert!(errors.contains("tags", TAGS_NOT_FOUND));
    assert!(errors.get("cooking_time").is_some());
    assert_eq!(
        errors.into_map().into_keys().collect::<Vec<_>>(),
        vec!["cooking_time", "ingredients", "tags"]
    );
}

#[test]
fn test_tags_only_update_leaves_ingredients_alone() {
    let fixture = Fixture::new();
    let input = RecipeInput {
        tags: Some(vec![3]),
        ..Default::default()
    };
    let changes = validate_recipe_changes(input, &fixture.catalog()).unwrap();
    assert!(changes.ingredients.is_none());
    assert_eq!(changes.tags, Some(vec![3]));
}
