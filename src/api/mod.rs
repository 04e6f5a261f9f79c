pub mod admin;
pub mod error;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::ledger::Ledger;
use crate::middleware::{auth::TokenKeys, logging::logging_middleware};

use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(ledger: Ledger, keys: Arc<TokenKeys>) -> Router {
    let db = ledger.db_handle();

    Router::new()
        .merge(public_api_router())
        .nest("/api", user_api_router(db.clone(), keys.clone()))
        .nest("/api/admin", admin_api_router(db, keys.clone()))
        .layer(Extension(ledger))
        .layer(Extension(keys))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
