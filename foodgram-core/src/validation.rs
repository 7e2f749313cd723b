//! Field rules for recipe submissions.
//!
//! Every rule runs on every submission and the violations are collected per
//! field, so a client gets the complete list of problems in one response.
//! Existence checks take the set of ids the caller found in the database, which
//! keeps this module free of any storage concerns.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image::{decode_data_uri, DecodedImage};

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32000;
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;
pub const MAX_INGREDIENT_AMOUNT: i32 = 32000;
pub const MAX_RECIPE_NAME_LEN: usize = 256;

pub const FIELD_REQUIRED: &str = "This field is required.";
pub const FIELD_BLANK: &str = "This field may not be blank.";
pub const INGREDIENTS_REQUIRED: &str = "Ingredients are required.";
pub const INGREDIENTS_REPEAT: &str = "Ingredients must not repeat.";
pub const INGREDIENTS_NOT_FOUND: &str = "Some ingredients were not found.";
pub const TAGS_REQUIRED: &str = "Tags are required.";
pub const TAGS_REPEAT: &str = "Tags must not repeat.";
pub const TAGS_NOT_FOUND: &str = "Some tags were not found.";

/// Field-keyed validation messages.
///
/// Serializes as `{"field": ["message", ...]}`. Messages are deduplicated per
/// field so a rule violated by several list items is reported once.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single message for one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        let messages = self.0.entry(field.to_string()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str, message: &str) -> bool {
        self.get(field)
            .is_some_and(|messages| messages.iter().any(|m| m == message))
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// One `(ingredient id, amount)` pair of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

/// Raw recipe fields as submitted. Absent fields are `None`.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    /// Base64 data URI
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i32>>,
}

impl RecipeInput {
    /// Ingredient ids the caller needs to look up before validating.
    pub fn ingredient_ids(&self) -> Vec<i32> {
        self.ingredients
            .iter()
            .flatten()
            .map(|item| item.id)
            .collect()
    }

    /// Tag ids the caller needs to look up before validating.
    pub fn tag_ids(&self) -> Vec<i32> {
        self.tags.iter().flatten().copied().collect()
    }
}

/// Ids known to exist in storage.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub ingredient_ids: &'a HashSet<i32>,
    pub tag_ids: &'a HashSet<i32>,
}

/// A fully validated recipe, ready to be inserted.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: DecodedImage,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
}

/// A validated partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<DecodedImage>,
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i32>>,
}

impl RecipeChanges {
    /// Whether any column of the recipe row itself changes.
    pub fn touches_recipe_row(&self) -> bool {
        self.name.is_some()
            || self.text.is_some()
            || self.cooking_time.is_some()
            || self.image.is_some()
    }
}

/// Validate a submission for a new recipe. Every field is required.
pub fn validate_new_recipe(
    input: RecipeInput,
    catalog: &Catalog<'_>,
) -> Result<RecipeDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = required(input.name, "name", &mut errors);
    let text = required(input.text, "text", &mut errors);
    let cooking_time = required(input.cooking_time, "cooking_time", &mut errors);
    let image = required(input.image, "image", &mut errors);
    let ingredients = match input.ingredients {
        Some(items) => Some(items),
        None => {
            errors.add("ingredients", INGREDIENTS_REQUIRED);
            None
        }
    };
    let tags = match input.tags {
        Some(ids) => Some(ids),
        None => {
            errors.add("tags", TAGS_REQUIRED);
            None
        }
    };

    let changes = check_fields(
        RecipeInput {
            name,
            text,
            cooking_time,
            image,
            ingredients,
            tags,
        },
        catalog,
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(errors);
    }

    match changes {
        RecipeChanges {
            name: Some(name),
            text: Some(text),
            cooking_time: Some(cooking_time),
            image: Some(image),
            ingredients: Some(ingredients),
            tags: Some(tags),
        } => Ok(RecipeDraft {
            name,
            text,
            cooking_time,
            image,
            ingredients,
            tags,
        }),
        // Unreachable when no errors were recorded, but stay total.
        _ => Err(ValidationErrors::single("non_field_errors", FIELD_REQUIRED)),
    }
}

/// Validate a partial update. Absent fields are skipped; present fields obey
/// the same rules as on creation.
pub fn validate_recipe_changes(
    input: RecipeInput,
    catalog: &Catalog<'_>,
) -> Result<RecipeChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = check_fields(input, catalog, &mut errors);
    errors.into_result(changes)
}

fn required<T>(value: Option<T>, field: &str, errors: &mut ValidationErrors) -> Option<T> {
    if value.is_none() {
        errors.add(field, FIELD_REQUIRED);
    }
    value
}

fn check_fields(
    input: RecipeInput,
    catalog: &Catalog<'_>,
    errors: &mut ValidationErrors,
) -> RecipeChanges {
    if let Some(name) = &input.name {
        check_name(name, errors);
    }
    if let Some(text) = &input.text {
        if text.trim().is_empty() {
            errors.add("text", FIELD_BLANK);
        }
    }
    if let Some(cooking_time) = input.cooking_time {
        check_cooking_time(cooking_time, errors);
    }
    let image = input
        .image
        .as_deref()
        .and_then(|raw| check_image(raw, errors));
    if let Some(items) = &input.ingredients {
        check_ingredients(items, catalog.ingredient_ids, errors);
    }
    if let Some(ids) = &input.tags {
        check_tags(ids, catalog.tag_ids, errors);
    }

    RecipeChanges {
        name: input.name.map(|n| n.trim().to_string()),
        text: input.text,
        cooking_time: input.cooking_time,
        image,
        ingredients: input.ingredients,
        tags: input.tags,
    }
}

fn check_name(name: &str, errors: &mut ValidationErrors) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.add("name", FIELD_BLANK);
    } else if trimmed.chars().count() > MAX_RECIPE_NAME_LEN {
        errors.add(
            "name",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_RECIPE_NAME_LEN
            ),
        );
    }
}

pub fn check_cooking_time(cooking_time: i32, errors: &mut ValidationErrors) {
    if cooking_time < MIN_COOKING_TIME {
        errors.add(
            "cooking_time",
            format!("Cooking time must be at least {} minute.", MIN_COOKING_TIME),
        );
    } else if cooking_time > MAX_COOKING_TIME {
        errors.add(
            "cooking_time",
            format!("Cooking time must be at most {} minutes.", MAX_COOKING_TIME),
        );
    }
}

fn check_image(raw: &str, errors: &mut ValidationErrors) -> Option<DecodedImage> {
    match decode_data_uri(raw) {
        Ok(image) => Some(image),
        Err(e) => {
            errors.add("image", e.to_string());
            None
        }
    }
}

pub fn check_ingredients(
    items: &[IngredientAmount],
    known: &HashSet<i32>,
    errors: &mut ValidationErrors,
) {
    if items.is_empty() {
        errors.add("ingredients", INGREDIENTS_REQUIRED);
        return;
    }

    let mut seen = HashSet::with_capacity(items.len());
    if !items.iter().all(|item| seen.insert(item.id)) {
        errors.add("ingredients", INGREDIENTS_REPEAT);
    }

    if items.iter().any(|item| !known.contains(&item.id)) {
        errors.add("ingredients", INGREDIENTS_NOT_FOUND);
    }

    for item in items {
        if item.amount < MIN_INGREDIENT_AMOUNT {
            errors.add(
                "ingredients",
                format!(
                    "Ingredient amount must be at least {}.",
                    MIN_INGREDIENT_AMOUNT
                ),
            );
        } else if item.amount > MAX_INGREDIENT_AMOUNT {
            errors.add(
                "ingredients",
                format!(
                    "Ingredient amount must be at most {}.",
                    MAX_INGREDIENT_AMOUNT
                ),
            );
        }
    }
}

pub fn check_tags(ids: &[i32], known: &HashSet<i32>, errors: &mut ValidationErrors) {
    if ids.is_empty() {
        errors.add("tags", TAGS_REQUIRED);
        return;
    }

    let mut seen = HashSet::with_capacity(ids.len());
    if !ids.iter().all(|id| seen.insert(*id)) {
        errors.add("tags", TAGS_REPEAT);
    }

    if ids.iter().any(|id| !known.contains(id)) {
        errors.add("tags", TAGS_NOT_FOUND);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn ids(values: &[i32]) -> HashSet<i32> {
        values.iter().copied().collect()
    }

    fn amount(id: i32, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn test_errors_are_deduplicated_per_field() {
        let mut errors = ValidationErrors::new();
        errors.add("tags", TAGS_REPEAT);
        errors.add("tags", TAGS_REPEAT);
        errors.add("tags", TAGS_NOT_FOUND);
        assert_eq!(errors.get("tags").unwrap().len(), 2);
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("tags", TAGS_REQUIRED);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "tags": [TAGS_REQUIRED] }));
    }

    #[test]
    fn test_add_dedupes_per_field() {
        let mut errors = ValidationErrors::single("name", FIELD_BLANK);
        errors.add("name", FIELD_BLANK);
        errors.add("text", FIELD_BLANK);
        assert_eq!(errors.get("name"), Some(&[FIELD_BLANK.to_string()][..]));
        assert_eq!(errors.into_map().len(), 2);
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("a", "x");
        errors.add("b", "y");
        assert_eq!(errors.to_string(), "a: x; b: y");
    }

    #[test]
    fn test_check_ingredients_reports_all_problems() {
        let mut errors = ValidationErrors::new();
        check_ingredients(
            &[amount(1, 5), amount(1, 0), amount(99, 40000)],
            &ids(&[1]),
            &mut errors,
        );
        assert!(errors.contains("ingredients", INGREDIENTS_REPEAT));
        assert!(errors.contains("ingredients", INGREDIENTS_NOT_FOUND));
        assert!(errors.contains("ingredients", "Ingredient amount must be at least 1."));
        assert!(errors.contains("ingredients", "Ingredient amount must be at most 32000."));
    }

    #[test]
    fn test_check_ingredients_empty() {
        let mut errors = ValidationErrors::new();
        check_ingredients(&[], &ids(&[1]), &mut errors);
        assert_eq!(errors.get("ingredients").unwrap(), [INGREDIENTS_REQUIRED]);
    }

    #[test]
    fn test_check_tags() {
        let mut errors = ValidationErrors::new();
        check_tags(&[1, 2, 2, 7], &ids(&[1, 2]), &mut errors);
        assert!(errors.contains("tags", TAGS_REPEAT));
        assert!(errors.contains("tags", TAGS_NOT_FOUND));

        let mut errors = ValidationErrors::new();
        check_tags(&[1, 2], &ids(&[1, 2]), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_cooking_time_bounds() {
        for (value, ok) in [(0, false), (1, true), (32000, true), (32001, false)] {
            let mut errors = ValidationErrors::new();
            check_cooking_time(value, &mut errors);
            assert_eq!(errors.is_empty(), ok, "cooking_time = {}", value);
        }
    }

    #[test]
    fn test_new_recipe_requires_everything() {
        let known = ids(&[]);
        let catalog = Catalog {
            ingredient_ids: &known,
            tag_ids: &known,
        };
        let errors = validate_new_recipe(RecipeInput::default(), &catalog).unwrap_err();
        for field in ["name", "text", "cooking_time", "image"] {
            assert!(errors.contains(field, FIELD_REQUIRED), "{}", field);
        }
        assert!(errors.contains("ingredients", INGREDIENTS_REQUIRED));
        assert!(errors.contains("tags", TAGS_REQUIRED));
    }

    #[test]
    fn test_new_recipe_valid() {
        let ingredient_ids = ids(&[1, 2]);
        let tag_ids = ids(&[10]);
        let catalog = Catalog {
            ingredient_ids: &ingredient_ids,
            tag_ids: &tag_ids,
        };
        let input = RecipeInput {
            name: Some("  Soup ".to_string()),
            text: Some("Boil.".to_string()),
            cooking_time: Some(15),
            image: Some(PNG_URI.to_string()),
            ingredients: Some(vec![amount(1, 100), amount(2, 3)]),
            tags: Some(vec![10]),
        };
        let draft = validate_new_recipe(input, &catalog).unwrap();
        assert_eq!(draft.name, "Soup");
        assert_eq!(draft.ingredients.len(), 2);
        assert_eq!(draft.tags, vec![10]);
        assert_eq!(draft.image.extension, "png");
    }

    #[test]
    fn test_changes_skip_absent_fields() {
        let known = ids(&[3]);
        let catalog = Catalog {
            ingredient_ids: &known,
            tag_ids: &known,
        };
        let input = RecipeInput {
            tags: Some(vec![3]),
            ..Default::default()
        };
        let changes = validate_recipe_changes(input, &catalog).unwrap();
        assert!(changes.ingredients.is_none());
        assert_eq!(changes.tags, Some(vec![3]));
        assert!(!changes.touches_recipe_row());
    }

    #[test]
    fn test_changes_reject_present_but_empty_lists() {
        let known = ids(&[]);
        let catalog = Catalog {
            ingredient_ids: &known,
            tag_ids: &known,
        };
        let input = RecipeInput {
            ingredients: Some(vec![]),
            tags: Some(vec![]),
            name: Some("   ".to_string()),
            ..Default::default()
        };
        let errors = validate_recipe_changes(input, &catalog).unwrap_err();
        assert!(errors.contains("ingredients", INGREDIENTS_REQUIRED));
        assert!(errors.contains("tags", TAGS_REQUIRED));
        assert!(errors.contains("name", FIELD_BLANK));
    }

    #[test]
    fn test_bad_image_is_reported_with_other_fields() {
        let known = ids(&[1]);
        let catalog = Catalog {
            ingredient_ids: &known,
            tag_ids: &known,
        };
        let input = RecipeInput {
            image: Some("not a data uri".to_string()),
            cooking_time: Some(0),
            ..Default::default()
        };
        let errors = validate_recipe_changes(input, &catalog).unwrap_err();
        assert!(errors.get("image").is_some());
        assert!(errors.get("cooking_time").is_some());
    }

    #[test]
    fn test_long_name_rejected() {
        let mut errors = ValidationErrors::new();
        check_name(&"x".repeat(MAX_RECIPE_NAME_LEN + 1), &mut errors);
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn test_referenced_ids() {
        let input = RecipeInput {
            ingredients: Some(vec![amount(4, 1), amount(5, 1)]),
            tags: Some(vec![7]),
            ..Default::default()
        };
        assert_eq!(input.ingredient_ids(), vec![4, 5]);
        assert_eq!(input.tag_ids(), vec![7]);
        assert!(RecipeInput::default().ingredient_ids().is_empty());
    }
}
