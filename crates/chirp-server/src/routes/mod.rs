pub mod follows;
pub mod health;
pub mod sessions;
pub mod users;

use axum::Extension;
use serde::Deserialize;

use crate::auth::SessionSecret;
use crate::state::AppState;
use chirp_core::AccountStore;

/// `?page=N` on listing endpoints. Missing or zero means the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

pub fn build_router<A: AccountStore>(state: AppState<A>) -> axum::Router {
    let session_secret = SessionSecret(state.config.jwt.session_secret.clone());

    axum::Router::new()
        .route("/_health", axum::routing::get(health::health_check))
        // Accounts
        .route(
            "/users",
            axum::routing::get(users::index::<A>).post(users::store::<A>),
        )
        .route(
            "/users/{id}",
            axum::routing::get(users::show::<A>)
                .patch(users::update::<A>)
                .delete(users::destroy::<A>),
        )
        .route(
            "/signup/confirm/{token}",
            axum::routing::get(users::confirm_email::<A>),
        )
        .route("/login", axum::routing::post(sessions::login::<A>))
        // Social graph
        .route(
            "/users/{id}/followings",
            axum::routing::get(users::followings::<A>),
        )
        .route(
            "/users/{id}/followers",
            axum::routing::get(users::followers::<A>),
        )
        .route(
            "/users/followers/{id}",
            axum::routing::post(follows::follow::<A>).delete(follows::unfollow::<A>),
        )
        .layer(Extension(session_secret))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Account forms are small; 64 KiB is plenty.
        .layer(tower_http::limit::RequestBodyLimitLayer::new(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
