pub mod auth;

use axum::{routing::get, Router};

use auth::auth_router;

pub fn public_api_router() -> Router {
    Router::new()
        .route("/", get(|| async { "Welcome to the inventory API" }))
        .merge(auth_router())
}
