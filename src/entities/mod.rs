pub mod product;
pub mod product_variant;
pub mod sales;
pub mod sales_record;
pub mod stock_transaction;
pub mod user;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Schema, Set,
};
use tracing::info;

/// Creates every table the ledger needs, parents before children so the
/// foreign keys resolve on strict backends.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = vec![
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(product::Entity),
        schema.create_table_from_entity(product_variant::Entity),
        schema.create_table_from_entity(sales::Entity),
        schema.create_table_from_entity(sales_record::Entity),
        schema.create_table_from_entity(stock_transaction::Entity),
    ];
    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    let mut indexes = Vec::new();
    indexes.extend(schema.create_index_from_entity(product_variant::Entity));
    indexes.extend(schema.create_index_from_entity(sales::Entity));
    indexes.extend(schema.create_index_from_entity(sales_record::Entity));
    indexes.extend(schema.create_index_from_entity(stock_transaction::Entity));
    for index in indexes.iter_mut() {
        index.if_not_exists();
        db.execute(backend.build(&*index)).await?;
    }

    Ok(())
}

/// Inserts the first admin account unless one already exists.
/// Returns whether a user was created.
pub async fn seed_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<bool, DbErr> {
    let admins = user::Entity::find()
        .filter(user::Column::Role.eq(user::Role::Admin))
        .count(db)
        .await?;
    if admins > 0 {
        return Ok(false);
    }

    let password_hash =
        user::hash_password(password).map_err(|err| DbErr::Custom(err.to_string()))?;

    let new_admin = user::ActiveModel {
        username: Set(username.to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::Admin),
        ..Default::default()
    };
    user::Entity::insert(new_admin).exec(db).await?;
    info!(username = %username, "Seeded admin account");

    Ok(true)
}
