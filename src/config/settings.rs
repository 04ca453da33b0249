use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://dwitter.db";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;

#[derive(Clone)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    pub database_url: String,
    pub secret_key: String,
    pub session_ttl_hours: i64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);

        Ok(Self {
            port,
            addr,
            database_url,
            secret_key,
            session_ttl_hours,
        })
    }
}
