use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    Form,
};
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::{
    auth::session::Claims,
    dweets::{Dweet, DweetAuthor, DweetForm, DweetResponse, FeedFilter, FeedResponse},
    error::AppError,
    response::ApiResponse,
};

pub const DASHBOARD_URL: &str = "/home/";

/// Helper struct for fetching dweets with author info
#[derive(FromRow)]
pub(crate) struct DweetRow {
    id: i64,
    body: String,
    created_at: chrono::DateTime<chrono::Utc>,
    user_id: i64,
    username: String,
}

impl From<DweetRow> for DweetResponse {
    fn from(d: DweetRow) -> Self {
        DweetResponse {
            id: d.id,
            author: DweetAuthor {
                id: d.user_id,
                username: d.username,
            },
            body: d.body,
            created_at: d.created_at,
        }
    }
}

/// Dweets by one user, newest first
pub(crate) async fn dweets_by_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<DweetResponse>, AppError> {
    let rows = sqlx::query_as::<_, DweetRow>(
        r#"
        SELECT d.id, d.body, d.created_at, d.user_id, u.username
        FROM dweets d
        JOIN users u ON d.user_id = u.id
        WHERE d.user_id = $1
        ORDER BY d.created_at DESC, d.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(DweetResponse::from).collect())
}

/// Feed: dweets from every profile the viewer follows, self included
/// GET /home/
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    claims: Claims,
    Query(filter): Query<FeedFilter>,
) -> Result<impl IntoResponse, AppError> {
    let limit = filter.limit();
    let offset = filter.offset();

    // One extra row tells us whether another page exists
    let mut rows = sqlx::query_as::<_, DweetRow>(
        r#"
        SELECT d.id, d.body, d.created_at, d.user_id, u.username
        FROM dweets d
        JOIN users u ON d.user_id = u.id
        JOIN profiles author ON author.user_id = d.user_id
        JOIN profile_follows f ON f.followed_id = author.id
        JOIN profiles viewer ON viewer.id = f.follower_id
        WHERE viewer.user_id = $1
        ORDER BY d.created_at DESC, d.id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(claims.sub)
    .bind(limit + 1)
    .bind(offset)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Feed error: {:?}", e);
        AppError::InternalServerError
    })?;

    let has_more = rows.len() as i64 > limit;
    rows.truncate(limit as usize);

    Ok(ApiResponse::success(FeedResponse {
        dweets: rows.into_iter().map(DweetResponse::from).collect(),
        has_more,
    }))
}

/// POST /home/
///
/// The author is always the session user.
pub async fn create_dweet(
    State(pool): State<SqlitePool>,
    claims: Claims,
    Form(form): Form<DweetForm>,
) -> Result<Redirect, AppError> {
    let form = form.cleaned();
    if let Err(e) = form.validate() {
        tracing::debug!("Dweet rejected: {}", e);
        return Ok(Redirect::to(DASHBOARD_URL));
    }

    let dweet = sqlx::query_as::<_, Dweet>(
        "INSERT INTO dweets (user_id, body, created_at) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(claims.sub)
    .bind(&form.body)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await?;

    tracing::info!(dweet_id = dweet.id, user_id = dweet.user_id, "dweet created");

    Ok(Redirect::to(DASHBOARD_URL))
}
