use std::str::FromStr;

use axum::extract::FromRef;
use dotenv::dotenv;
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod dweets;
mod error;
mod profiles;
mod response;
mod routes;
#[cfg(test)]
mod test_util;

use config::settings::Settings;

pub static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    settings: Settings,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> SqlitePool {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Settings {
    fn from_ref(app_state: &AppState) -> Settings {
        app_state.settings.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dwitter=info,tower_http=info")),
        )
        .init();

    let settings = Settings::new()?;

    let connect_options = SqliteConnectOptions::from_str(&settings.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    info!("database connected");

    MIGRATOR.run(&pool).await?;

    info!("migrations applied");

    let app_state = AppState {
        pool,
        settings: settings.clone(),
    };

    let app = routes::router(app_state);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
