pub mod product;
pub mod sales;
pub mod stock;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, TokenKeys};
use product::product_router;
use sales::sales_router;
use stock::stock_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, keys: Arc<TokenKeys>) -> Router {
    Router::new()
        .merge(product_router())
        .merge(sales_router())
        .merge(stock_router())
        .layer(from_fn_with_state(
            AuthState {
                db,
                keys,
                role: Role::User,
            },
            auth_middleware,
        ))
}
