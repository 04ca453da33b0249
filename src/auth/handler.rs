use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::CookieJar;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::{
        session::{self, Claims},
        store::{self, NewUser},
        utils, LandingResponse, LoginForm, RegisterForm, UserResponse,
    },
    config::settings::Settings,
    error::AppError,
    response::{ApiResponse, FormSchema},
};

pub const LANDING_URL: &str = "/signin_dashboard/";
pub const REGISTER_URL: &str = "/register/";

/// GET / and /signin_dashboard/
pub async fn signin_dashboard(
    State(pool): State<SqlitePool>,
    claims: Option<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = match claims {
        Some(claims) => store::find_by_id(&pool, claims.sub).await?,
        None => None,
    };

    Ok(match user {
        Some(user) => ApiResponse::success_with_message(
            format!("Signed in as {}", user.username),
            LandingResponse {
                user: Some(UserResponse::from(user)),
            },
        ),
        None => ApiResponse::success(LandingResponse { user: None }),
    })
}

/// GET /register/
pub async fn register_form() -> impl IntoResponse {
    ApiResponse::success(FormSchema {
        action: REGISTER_URL,
        fields: &["username", "email", "password1", "password2"],
    })
}

/// POST /register/
///
/// Any failure, including a taken username, sends the client back to the
/// registration page without a session.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(settings): State<Settings>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Err(e) = form.validate() {
        tracing::debug!("Registration rejected: {}", e);
        return Ok((jar, Redirect::to(REGISTER_URL)));
    }

    let password_hash =
        utils::hash_password(&form.password1).map_err(|_| AppError::InternalServerError)?;

    let mut tx = pool.begin().await?;

    let created = store::create_user(
        &mut *tx,
        NewUser {
            username: &form.username,
            email: &form.email,
            password_hash: &password_hash,
        },
    )
    .await;

    let user = match created {
        Ok((user, _profile)) => user,
        Err(e) if store::is_unique_violation(&e) => {
            tracing::debug!("Registration rejected: username {:?} taken", form.username);
            tx.rollback().await?;
            return Ok((jar, Redirect::to(REGISTER_URL)));
        }
        Err(e) => return Err(e.into()),
    };

    let user = store::record_login(&mut *tx, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "user registered");

    let token = session::create_token(user.id, &user.username, &settings)
        .map_err(|_| AppError::InternalServerError)?;

    Ok((
        jar.add(session::session_cookie(token)),
        Redirect::to(LANDING_URL),
    ))
}

/// GET /accounts/login/
pub async fn login_form() -> impl IntoResponse {
    ApiResponse::success(FormSchema {
        action: session::LOGIN_URL,
        fields: &["username", "password", "next"],
    })
}

/// POST /accounts/login/
pub async fn login(
    State(pool): State<SqlitePool>,
    State(settings): State<Settings>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let retry = Redirect::to(session::LOGIN_URL);

    if form.validate().is_err() {
        return Ok((jar, retry));
    }

    let Some(user) = store::find_by_username(&pool, &form.username).await? else {
        return Ok((jar, retry));
    };

    if utils::verify_password(&user.password_hash, &form.password).is_err() {
        tracing::debug!(user_id = user.id, "Sign-in rejected: bad password");
        return Ok((jar, retry));
    }

    let mut conn = pool.acquire().await?;
    let user = store::record_login(&mut *conn, user.id).await?;
    drop(conn);

    let token = session::create_token(user.id, &user.username, &settings)
        .map_err(|_| AppError::InternalServerError)?;

    let target = form
        .next
        .as_deref()
        .filter(|next| is_local_path(next))
        .unwrap_or(LANDING_URL);

    Ok((
        jar.add(session::session_cookie(token)),
        Redirect::to(target),
    ))
}

/// GET|POST /accounts/logout/
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(session::removal_cookie()), Redirect::to(LANDING_URL))
}

/// Only same-site absolute paths are honoured as post-login targets. No control
/// characters: browsers strip tab/CR/LF, so `/\t/host` would become `//host`.
fn is_local_path(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control)
}
