//! Stable short codes for recipes.

use diesel::prelude::*;
use foodgram_core::short_link::MAX_ATTEMPTS;
use foodgram_core::{claim_with_retry, generate_code, Claim};

use crate::error::ApiError;
use crate::models::NewShortLink;
use crate::schema::short_links;

fn code_for(conn: &mut PgConnection, recipe_id: i32) -> QueryResult<Option<String>> {
    short_links::table
        .filter(short_links::recipe_id.eq(recipe_id))
        .select(short_links::code)
        .first(conn)
        .optional()
}

/// Return the recipe's code, creating one on first request.
///
/// The insert ignores conflicts on either unique column. When nothing was
/// inserted the recipe row is re-read: a code there means another request got
/// in first, otherwise the candidate belonged to a different recipe.
pub fn get_or_create(conn: &mut PgConnection, recipe_id: i32) -> Result<String, ApiError> {
    if let Some(code) = code_for(conn, recipe_id)? {
        return Ok(code);
    }

    let code = claim_with_retry::<ApiError, _, _>(MAX_ATTEMPTS, generate_code, |candidate| {
        let inserted = diesel::insert_into(short_links::table)
            .values(&NewShortLink {
                recipe_id,
                code: candidate,
            })
            .on_conflict_do_nothing()
            .execute(conn)?;

        if inserted > 0 {
            return Ok(Claim::Claimed);
        }
        match code_for(conn, recipe_id)? {
            Some(existing) => Ok(Claim::Existing(existing)),
            None => {
                tracing::debug!(recipe_id, candidate, "short code collision");
                Ok(Claim::Collision)
            }
        }
    })?;

    Ok(code)
}

/// The recipe a code points to, if any.
pub fn resolve(conn: &mut PgConnection, code: &str) -> QueryResult<Option<i32>> {
    short_links::table
        .filter(short_links::code.eq(code))
        .select(short_links::recipe_id)
        .first(conn)
        .optional()
}
