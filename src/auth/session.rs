use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
    RequestPartsExt,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::settings::Settings;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_URL: &str = "/accounts/login/";

/// Signed session payload. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

pub fn create_token(user_id: i64, username: &str, settings: &Settings) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (now + Duration::hours(settings.session_ttl_hours)).timestamp(),
        iat: now.timestamp(),
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret_key.as_ref()),
    )?)
}

/// The token carries its own expiry, so the cookie itself is not dated.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie handed to `CookieJar::remove` on sign-out. Path must match the one
/// the session cookie was set with.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

fn decode_claims(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// The session cookie is checked first; a bearer token is accepted as a
/// fallback for non-browser clients. Anonymous requests are sent to the login
/// page.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
    Settings: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let settings = Settings::from_ref(state);

        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| Redirect::to(LOGIN_URL))?;
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if let Some(claims) = decode_claims(cookie.value(), &settings.secret_key) {
                return Ok(claims);
            }
        }

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Redirect::to(LOGIN_URL))?;

        decode_claims(bearer.token(), &settings.secret_key).ok_or_else(|| Redirect::to(LOGIN_URL))
    }
}
