use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    auth::User,
    profiles::{
        hooks::{self, UserSaved},
        Profile,
    },
};

/// Fields needed to create an account. The password is already hashed.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Inserts the user and runs the post-save hook on the same connection.
/// Callers pass a transaction so the user and its profile commit together.
pub async fn create_user(
    conn: &mut SqliteConnection,
    new_user: NewUser<'_>,
) -> Result<(User, Profile), sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, date_joined)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    let profile = hooks::on_user_saved(&mut *conn, UserSaved::Created(&user))
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok((user, profile))
}

/// Stamps `last_login`. This is an update, so the hook leaves the profile alone.
pub async fn record_login(conn: &mut SqliteConnection, user_id: i64) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET last_login = $1 WHERE id = $2 RETURNING *",
    )
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    hooks::on_user_saved(&mut *conn, UserSaved::Updated(&user)).await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
