pub mod product;
pub mod stock;
pub mod user;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use product::admin_product_router;
use stock::admin_stock_router;
use user::admin_user_router;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, TokenKeys};

pub fn admin_api_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .merge(admin_product_router())
        .merge(admin_stock_router())
        .merge(admin_user_router())
        .layer(from_fn_with_state(
            AuthState {
                db,
                keys,
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
