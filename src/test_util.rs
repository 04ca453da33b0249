use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tower::ServiceExt;

use crate::{auth::session::SESSION_COOKIE, config::settings::Settings, routes, AppState};

pub const PASSWORD: &str = "tulip-orbit-42";

pub fn test_settings() -> Settings {
    Settings {
        port: 0,
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "sqlite::memory:".to_string(),
        secret_key: "test-secret".to_string(),
        session_ttl_hours: 1,
    }
}

/// In-memory database with migrations applied. A single connection that is
/// never recycled, since the data lives and dies with it.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    crate::MIGRATOR.run(&pool).await.unwrap();
    pool
}

pub async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let state = AppState {
        pool: pool.clone(),
        settings: test_settings(),
    };
    (routes::router(state), pool)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub session: Option<String>,
    pub json: serde_json::Value,
}

/// Sends one request through the router. `form` is url-encoded as the body;
/// `session` is sent as the session cookie.
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    session: Option<&str>,
    form: Option<&[(&str, &str)]>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = session {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
    }
    let body = match form {
        Some(fields) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(serde_urlencoded::to_string(fields).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let session = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
        .next();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    TestResponse {
        status,
        location,
        session,
        json,
    }
}

/// Registers `username` through the HTTP flow and returns the session token.
pub async fn register(app: &Router, username: &str) -> String {
    let res = call(
        app,
        "POST",
        "/register/",
        None,
        Some(&[
            ("username", username),
            ("password1", PASSWORD),
            ("password2", PASSWORD),
        ]),
    )
    .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/signin_dashboard/"));
    res.session.expect("registration sets a session cookie")
}

pub async fn profile_id_of(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query_scalar(
        "SELECT p.id FROM profiles p JOIN users u ON p.user_id = u.id WHERE u.username = $1",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}
