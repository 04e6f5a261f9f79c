#![allow(dead_code)]

use inventory_api::entities::{setup_schema, user};
use inventory_api::ledger::{Ledger, NewProduct, NewVariant};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::str::FromStr;
use std::sync::Arc;

/// Fresh in-memory database. One pooled connection keeps every caller on the
/// same SQLite memory instance.
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");
    db
}

pub async fn ledger() -> Ledger {
    Ledger::new(Arc::new(memory_db().await))
}

pub fn money(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub async fn create_user(ledger: &Ledger, username: &str) -> i32 {
    user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set("not-a-real-hash".to_owned()),
        role: Set(user::Role::User),
        ..Default::default()
    }
    .insert(ledger.db())
    .await
    .expect("Failed to insert user")
    .id
}

/// Product with one variant at `price` holding `stock` units.
pub async fn create_variant(ledger: &Ledger, price: &str, stock: i32) -> i32 {
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "T-Shirt".into(),
            description: "Plain cotton tee".into(),
            category: "apparel".into(),
        })
        .await
        .expect("Failed to create product");

    catalog
        .create_variant(
            product.id,
            NewVariant {
                color: "black".into(),
                size: "M".into(),
                price: money(price),
                initial_stock: stock,
            },
        )
        .await
        .expect("Failed to create variant")
        .id
}
