pub mod api;
pub mod config;
pub mod entities;
pub mod ledger;
pub mod middleware;

use axum::Router;
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::api::create_api_router;
use crate::config::AppConfig;
use crate::entities::{seed_admin, setup_schema};
use crate::ledger::Ledger;
use crate::middleware::auth::TokenKeys;

/// Connects, creates the schema and seeds the first admin when configured.
pub async fn connect(config: &AppConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.database_url.as_str()).await?;
    setup_schema(&db).await?;

    if let Some(seed) = &config.admin_seed {
        seed_admin(&db, &seed.username, &seed.password).await?;
    }
    Ok(db)
}

pub fn build_app(db: Arc<DatabaseConnection>, config: &AppConfig) -> Router {
    let ledger = Ledger::new(db);
    let keys = Arc::new(TokenKeys::new(config.secret.clone(), config.token_ttl_hours));
    create_api_router(ledger, keys)
}
