use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, dweets, profiles, AppState};

pub fn router(app_state: AppState) -> Router {
    let accounts_router = Router::new()
        .route(
            "/login/",
            get(auth::handler::login_form).post(auth::handler::login),
        )
        .route(
            "/logout/",
            get(auth::handler::logout).post(auth::handler::logout),
        );

    Router::new()
        .route("/", get(auth::handler::signin_dashboard))
        .route("/signin_dashboard/", get(auth::handler::signin_dashboard))
        .route(
            "/register/",
            get(auth::handler::register_form).post(auth::handler::register),
        )
        .route(
            "/home/",
            get(dweets::handler::dashboard).post(dweets::handler::create_dweet),
        )
        .route("/profile_list/", get(profiles::handler::profile_list))
        .route(
            "/profile/:id",
            get(profiles::handler::profile_detail).post(profiles::handler::follow_action),
        )
        .nest("/accounts", accounts_router)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
