use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Build the connection pool and run pending migrations.
pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;

    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;
    for migration in applied {
        tracing::info!(%migration, "applied migration");
    }

    Ok(pool)
}

/// Check out a pooled connection or return `ApiError` from the handler.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        $pool.get().map_err(|e| {
            tracing::error!("Failed to get database connection: {}", e);
            $crate::error::ApiError::Internal("Database connection failed".to_string())
        })?
    };
}

/// Database fixtures for service tests. Each connection runs inside a
/// transaction that is never committed.
#[cfg(test)]
pub mod test_support {
    use std::sync::Once;

    use diesel::prelude::*;
    use diesel_migrations::MigrationHarness;
    use foodgram_core::{DecodedImage, IngredientAmount, RecipeDraft};
    use uuid::Uuid;

    use super::MIGRATIONS;
    use crate::models::{Ingredient, NewIngredient, NewTag, NewUser, Recipe, Tag, User};
    use crate::schema::{ingredients, tags, users};
    use crate::services::recipes;

    static MIGRATE: Once = Once::new();

    /// `None` when `DATABASE_URL` is unset, so callers can skip.
    pub fn connection() -> Option<PgConnection> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping database test");
            return None;
        };

        MIGRATE.call_once(|| {
            let mut conn = PgConnection::establish(&url).expect("connect to DATABASE_URL");
            conn.run_pending_migrations(MIGRATIONS).expect("run migrations");
        });

        let mut conn = PgConnection::establish(&url).expect("connect to DATABASE_URL");
        conn.begin_test_transaction().expect("begin test transaction");
        Some(conn)
    }

    /// Unique values keep concurrent tests off each other's index entries.
    fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
    }

    pub fn user(conn: &mut PgConnection) -> User {
        let username = unique("cook");
        diesel::insert_into(users::table)
            .values(&NewUser {
                email: &format!("{}@example.com", username),
                username: &username,
                first_name: "Ann",
                last_name: "Lee",
                password_hash: "unused",
            })
            .returning(User::as_returning())
            .get_result(conn)
            .unwrap()
    }

    pub fn tag(conn: &mut PgConnection) -> Tag {
        let slug = unique("tag");
        diesel::insert_into(tags::table)
            .values(&NewTag {
                name: slug.clone(),
                slug,
            })
            .returning(Tag::as_returning())
            .get_result(conn)
            .unwrap()
    }

    pub fn ingredient(conn: &mut PgConnection, measurement_unit: &str) -> Ingredient {
        diesel::insert_into(ingredients::table)
            .values(&NewIngredient {
                name: unique("flour"),
                measurement_unit: measurement_unit.to_string(),
            })
            .returning(Ingredient::as_returning())
            .get_result(conn)
            .unwrap()
    }

    pub fn png() -> DecodedImage {
        DecodedImage {
            data: vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'],
            content_type: "image/png".to_string(),
            extension: "png".to_string(),
        }
    }

    pub fn draft(ingredients: Vec<IngredientAmount>, tags: Vec<i32>) -> RecipeDraft {
        RecipeDraft {
            name: "Flatbread".to_string(),
            text: "Mix and bake.".to_string(),
            cooking_time: 25,
            image: png(),
            ingredients,
            tags,
        }
    }

    /// A stored recipe with one ingredient and one tag.
    pub fn recipe(conn: &mut PgConnection, author_id: i32) -> Recipe {
        let flour = ingredient(conn, "g");
        let tag = tag(conn);
        let draft = draft(
            vec![IngredientAmount {
                id: flour.id,
                amount: 200,
            }],
            vec![tag.id],
        );
        recipes::create(conn, author_id, &draft).unwrap()
    }
}
