use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Form,
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::{
    auth::session::Claims,
    dweets::handler::dweets_by_user,
    error::AppError,
    profiles::{FollowAction, FollowForm, ProfileDetailResponse, ProfileSummary},
    response::ApiResponse,
};

const SUMMARY_COLUMNS: &str = r#"
    p.id, p.user_id, u.username,
    (SELECT COUNT(*) FROM profile_follows WHERE followed_id = p.id) AS followers_count,
    (SELECT COUNT(*) FROM profile_follows WHERE follower_id = p.id) AS following_count
"#;

/// Every profile except the viewer's own
/// GET /profile_list/
pub async fn profile_list(
    State(pool): State<SqlitePool>,
    claims: Option<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let query = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM profiles p
        JOIN users u ON p.user_id = u.id
        WHERE p.user_id != $1
        ORDER BY u.username
        "#
    );

    // Anonymous viewers see everyone; no user has id 0
    let viewer_id = claims.map(|c| c.sub).unwrap_or(0);

    let profiles = sqlx::query_as::<_, ProfileSummary>(&query)
        .bind(viewer_id)
        .fetch_all(&pool)
        .await?;

    Ok(ApiResponse::success(profiles))
}

/// GET /profile/:id
pub async fn profile_detail(
    State(pool): State<SqlitePool>,
    claims: Option<Claims>,
    Path(profile_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = load_profile_detail(&pool, profile_id, claims.map(|c| c.sub)).await?;
    Ok(ApiResponse::success(detail))
}

/// Follow or unfollow the profile from the viewer's profile, then show it
/// POST /profile/:id
pub async fn follow_action(
    State(pool): State<SqlitePool>,
    claims: Claims,
    Path(profile_id): Path<i64>,
    Form(form): Form<FollowForm>,
) -> Result<impl IntoResponse, AppError> {
    let target_exists = sqlx::query("SELECT 1 FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(&pool)
        .await?
        .is_some();
    if !target_exists {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    let viewer_profile_id: i64 = sqlx::query("SELECT id FROM profiles WHERE user_id = $1")
        .bind(claims.sub)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::Unauthorized)?
        .get("id");

    match FollowAction::parse(&form.follow) {
        Some(FollowAction::Follow) => {
            sqlx::query(
                r#"
                INSERT INTO profile_follows (follower_id, followed_id, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (follower_id, followed_id) DO NOTHING
                "#,
            )
            .bind(viewer_profile_id)
            .bind(profile_id)
            .bind(Utc::now())
            .execute(&pool)
            .await?;
            tracing::info!(follower = viewer_profile_id, followed = profile_id, "follow");
        }
        Some(FollowAction::Unfollow) => {
            sqlx::query("DELETE FROM profile_follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(viewer_profile_id)
                .bind(profile_id)
                .execute(&pool)
                .await?;
            tracing::info!(follower = viewer_profile_id, followed = profile_id, "unfollow");
        }
        None => {
            tracing::debug!("Ignoring follow action {:?}", form.follow);
        }
    }

    let detail = load_profile_detail(&pool, profile_id, Some(claims.sub)).await?;
    Ok(ApiResponse::success(detail))
}

async fn load_profile_detail(
    pool: &SqlitePool,
    profile_id: i64,
    viewer_user_id: Option<i64>,
) -> Result<ProfileDetailResponse, AppError> {
    let profile = sqlx::query(
        "SELECT p.id, p.user_id, u.username FROM profiles p JOIN users u ON p.user_id = u.id WHERE p.id = $1",
    )
    .bind(profile_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    let user_id: i64 = profile.get("user_id");

    let follows = sqlx::query_as::<_, ProfileSummary>(&format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM profile_follows f
        JOIN profiles p ON f.followed_id = p.id
        JOIN users u ON p.user_id = u.id
        WHERE f.follower_id = $1
        ORDER BY u.username
        "#
    ))
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    let followed_by = sqlx::query_as::<_, ProfileSummary>(&format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM profile_follows f
        JOIN profiles p ON f.follower_id = p.id
        JOIN users u ON p.user_id = u.id
        WHERE f.followed_id = $1
        ORDER BY u.username
        "#
    ))
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    let is_following = match viewer_user_id {
        Some(viewer) => sqlx::query(
            r#"
            SELECT 1 FROM profile_follows f
            JOIN profiles viewer ON viewer.id = f.follower_id
            WHERE viewer.user_id = $1 AND f.followed_id = $2
            "#,
        )
        .bind(viewer)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?
        .is_some(),
        None => false,
    };

    let dweets = dweets_by_user(pool, user_id).await?;

    Ok(ProfileDetailResponse {
        id: profile.get("id"),
        user_id,
        username: profile.get("username"),
        follows,
        followed_by,
        dweets,
        is_following,
    })
}
