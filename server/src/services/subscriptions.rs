//! Who follows whom.

use std::collections::HashSet;

use diesel::prelude::*;

use crate::models::{NewSubscription, User};
use crate::schema::{subscriptions, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    SelfSubscription,
}

pub fn subscribe(conn: &mut PgConnection, user_id: i32, author_id: i32) -> QueryResult<SubscribeOutcome> {
    if user_id == author_id {
        return Ok(SubscribeOutcome::SelfSubscription);
    }

    let inserted = diesel::insert_into(subscriptions::table)
        .values(&NewSubscription { user_id, author_id })
        .on_conflict_do_nothing()
        .execute(conn)?;

    Ok(if inserted > 0 {
        tracing::info!(user_id, author_id, "subscribed");
        SubscribeOutcome::Subscribed
    } else {
        SubscribeOutcome::AlreadySubscribed
    })
}

/// Returns `false` if there was no subscription.
pub fn unsubscribe(conn: &mut PgConnection, user_id: i32, author_id: i32) -> QueryResult<bool> {
    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::author_id.eq(author_id)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

/// Which of `author_ids` the user follows.
pub fn followed_among(
    conn: &mut PgConnection,
    user_id: i32,
    author_ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let found: Vec<i32> = subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load(conn)?;
    Ok(found.into_iter().collect())
}

/// One page of the authors a user follows, ordered by username.
pub fn list_followed(
    conn: &mut PgConnection,
    user_id: i32,
    limit: i64,
    offset: i64,
) -> QueryResult<(Vec<User>, i64)> {
    let followed = subscriptions::table
        .filter(subscriptions::user_id.eq(user_id))
        .select(subscriptions::author_id);

    let count: i64 = users::table
        .filter(users::id.eq_any(followed))
        .count()
        .get_result(conn)?;

    let page = users::table
        .filter(users::id.eq_any(followed))
        .select(User::as_select())
        .order(users::username.asc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;

    Ok((page, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn subscription_count(conn: &mut PgConnection, user_id: i32) -> i64 {
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .count()
            .get_result(conn)
            .unwrap()
    }

    #[test]
    fn test_self_subscription_is_rejected() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let user = test_support::user(&mut conn);

        for _ in 0..2 {
            assert_eq!(
                subscribe(&mut conn, user.id, user.id).unwrap(),
                SubscribeOutcome::SelfSubscription
            );
        }
        assert_eq!(subscription_count(&mut conn, user.id), 0);
    }

    #[test]
    fn test_subscribe_twice_reports_existing() {
        let Some(mut conn) = test_support::connection() else {
            return;
        };
        let reader = test_support::user(&mut conn);
        let author = test_support::user(&mut conn);

        assert_eq!(
            subscribe(&mut conn, reader.id, author.id).unwrap(),
            SubscribeOutcome::Subscribed
        );
        assert_eq!(
            subscribe(&mut conn, reader.id, author.id).unwrap(),
            SubscribeOutcome::AlreadySubscribed
        );
        assert_eq!(subscription_count(&mut conn, reader.id), 1);

        let followed = followed_among(&mut conn, reader.id, &[author.id, reader.id]).unwrap();
        assert_eq!(followed, HashSet::from([author.id]));

        assert!(unsubscribe(&mut conn, reader.id, author.id).unwrap());
        assert!(!unsubscribe(&mut conn, reader.id, author.id).unwrap());
    }
}
