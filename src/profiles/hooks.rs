use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{auth::User, profiles::Profile};

/// A write to the `users` table, as seen by hooks that run after it.
#[derive(Debug, Clone, Copy)]
pub enum UserSaved<'a> {
    Created(&'a User),
    Updated(&'a User),
}

/// Post-save hook for users. Must run on the connection (and transaction) that
/// wrote the user row, so that a user never exists without its profile.
///
/// On creation it inserts the profile and makes it follow itself, which puts
/// the user's own dweets in their feed. Updates are ignored.
pub async fn on_user_saved(
    conn: &mut SqliteConnection,
    event: UserSaved<'_>,
) -> Result<Option<Profile>, sqlx::Error> {
    let user = match event {
        UserSaved::Created(user) => user,
        UserSaved::Updated(_) => return Ok(None),
    };

    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (user_id) VALUES ($1) RETURNING id, user_id",
    )
    .bind(user.id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO profile_follows (follower_id, followed_id, created_at) VALUES ($1, $1, $2)",
    )
    .bind(profile.id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    tracing::debug!(user_id = user.id, profile_id = profile.id, "profile created");

    Ok(Some(profile))
}
