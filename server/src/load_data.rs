//! `load-data`: seed the ingredient catalogue and tags from JSON files.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::db::DbPool;
use crate::models::{NewIngredient, NewTag};
use crate::services::catalogue;

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Import `[{name, measurement_unit}]` and optionally `[{name, slug}]`.
/// Rows that already exist are skipped.
pub fn load(pool: &DbPool, ingredients: &Path, tags: Option<&Path>) -> anyhow::Result<()> {
    let mut conn = pool.get()?;

    let rows: Vec<NewIngredient> = read_json(ingredients)?;
    let added = catalogue::import_ingredients(&mut conn, &rows)?;
    tracing::info!(
        file = %ingredients.display(),
        total = rows.len(),
        added,
        "ingredients loaded"
    );

    if let Some(tags) = tags {
        let rows: Vec<NewTag> = read_json(tags)?;
        let added = catalogue::import_tags(&mut conn, &rows)?;
        tracing::info!(file = %tags.display(), total = rows.len(), added, "tags loaded");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_ingredient_file() {
        let path = std::env::temp_dir().join(format!("ingredients-{}.json", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"name": "salt", "measurement_unit": "g"}}, {{"name": "milk", "measurement_unit": "ml"}}]"#
        )
        .unwrap();

        let rows: Vec<NewIngredient> = read_json(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "milk");
        assert_eq!(rows[1].measurement_unit, "ml");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = read_json::<NewTag>(Path::new("/nonexistent/tags.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tags.json"));
    }
}
