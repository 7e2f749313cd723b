//! Accounts: registration, lookup, password and avatar changes.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use foodgram_core::{DecodedImage, Registration, ValidationErrors};

use crate::error::ApiError;
use crate::models::{NewUser, User};
use crate::schema::users;
use crate::services::media;

/// Map a unique violation on `users` to the field that caused it.
fn unique_violation_field(constraint: Option<&str>) -> Option<&'static str> {
    match constraint? {
        "users_email_key" => Some("email"),
        "users_username_key" => Some("username"),
        _ => None,
    }
}

/// Insert a validated registration. Duplicate email or username become
/// field errors rather than a server error.
pub fn register(
    conn: &mut PgConnection,
    registration: &Registration,
    password_hash: &str,
) -> Result<User, ApiError> {
    let result = diesel::insert_into(users::table)
        .values(&NewUser {
            email: &registration.email,
            username: &registration.username,
            first_name: &registration.first_name,
            last_name: &registration.last_name,
            password_hash,
        })
        .returning(User::as_returning())
        .get_result(conn);

    match result {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
            match unique_violation_field(info.constraint_name()) {
                Some(field) => Err(ValidationErrors::single(
                    field,
                    format!("A user with that {} already exists.", field),
                )
                .into()),
                None => Err(ApiError::Internal(format!(
                    "Unexpected unique violation: {}",
                    info.message()
                ))),
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub fn find(conn: &mut PgConnection, id: i32) -> QueryResult<Option<User>> {
    users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()
}

pub fn find_by_email(conn: &mut PgConnection, email: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::email.eq(email.trim().to_lowercase()))
        .select(User::as_select())
        .first(conn)
        .optional()
}

/// Load users by id, in no particular order.
pub fn find_many(conn: &mut PgConnection, ids: &[i32]) -> QueryResult<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    users::table
        .filter(users::id.eq_any(ids))
        .select(User::as_select())
        .load(conn)
}

pub fn list(conn: &mut PgConnection, limit: i64, offset: i64) -> QueryResult<(Vec<User>, i64)> {
    let count: i64 = users::table.count().get_result(conn)?;
    let page = users::table
        .select(User::as_select())
        .order(users::id.asc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;
    Ok((page, count))
}

pub fn set_password(conn: &mut PgConnection, user_id: i32, password_hash: &str) -> QueryResult<()> {
    diesel::update(users::table.find(user_id))
        .set(users::password_hash.eq(password_hash))
        .execute(conn)?;
    Ok(())
}

/// The user's current avatar, with the row locked until the transaction ends.
fn lock_avatar(conn: &mut PgConnection, user_id: i32) -> QueryResult<Option<String>> {
    users::table
        .find(user_id)
        .select(users::avatar)
        .for_update()
        .first(conn)
}

/// Store a new avatar and drop the previous one. Returns the new media name.
pub fn set_avatar(conn: &mut PgConnection, user_id: i32, image: &DecodedImage) -> QueryResult<String> {
    conn.transaction(|conn| {
        let previous = lock_avatar(conn, user_id)?;
        let name = media::store(conn, image)?;
        diesel::update(users::table.find(user_id))
            .set(users::avatar.eq(Some(name.as_str())))
            .execute(conn)?;
        if let Some(old) = previous {
            media::delete(conn, &old)?;
        }
        Ok(name)
    })
}

/// Remove the avatar, if any.
pub fn clear_avatar(conn: &mut PgConnection, user_id: i32) -> QueryResult<()> {
    conn.transaction(|conn| {
        let Some(old) = lock_avatar(conn, user_id)? else {
            return Ok(());
        };
        diesel::update(users::table.find(user_id))
            .set(users::avatar.eq(None::<String>))
            .execute(conn)?;
        media::delete(conn, &old)
    })
}
