use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{
    product,
    product_variant::{self, Entity as VariantEntity},
    sales_record,
    stock_transaction::{self, MovementKind},
};
use crate::ledger::aggregate::{price_in_range, round_money};
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::stock::{adjust_within, append_movement, lock_variant};

/// Products and their variants.
pub struct CatalogStore<'a> {
    db: &'a DatabaseConnection,
}

#[derive(Clone, Debug, Default)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NewVariant {
    pub color: String,
    pub size: String,
    pub price: Decimal,
    /// Recorded as an opening `in` movement, not written to the cache directly.
    pub initial_stock: i32,
}

#[derive(Clone, Debug, Default)]
pub struct VariantPatch {
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    /// Target balance, reached through one compensating movement.
    pub stock: Option<i32>,
}

impl<'a> CatalogStore<'a> {
    pub(crate) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, attrs: NewProduct) -> LedgerResult<product::Model> {
        let name = attrs.name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidProduct("name is required".into()));
        }

        let product = product::ActiveModel {
            name: Set(name.to_owned()),
            description: Set(attrs.description),
            category: Set(attrs.category),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!(product_id = product.id, name = %product.name, "Created product");
        Ok(product)
    }

    pub async fn get_product(&self, id: i32) -> LedgerResult<product::Model> {
        product::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product", id))
    }

    pub async fn list_products(&self) -> LedgerResult<Vec<product::Model>> {
        Ok(product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn update_product(
        &self,
        id: i32,
        patch: ProductPatch,
    ) -> LedgerResult<product::Model> {
        let current = self.get_product(id).await?;
        let mut product: product::ActiveModel = current.clone().into();

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(LedgerError::InvalidProduct("name is required".into()));
            }
            product.name = Set(name.to_owned());
        }
        if let Some(description) = patch.description {
            product.description = Set(description);
        }
        if let Some(category) = patch.category {
            product.category = Set(category);
        }

        if !product.is_changed() {
            return Ok(current);
        }
        Ok(product.update(self.db).await?)
    }

    /// Inserts a variant under an existing product. A positive
    /// `initial_stock` becomes the variant's first movement, committed
    /// together with the insert.
    pub async fn create_variant(
        &self,
        product_id: i32,
        attrs: NewVariant,
    ) -> LedgerResult<product_variant::Model> {
        if !price_in_range(attrs.price) {
            return Err(LedgerError::InvalidPrice);
        }
        if attrs.initial_stock < 0 {
            return Err(LedgerError::InvalidQuantity(attrs.initial_stock.into()));
        }

        let txn = self.db.begin().await?;
        product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product", product_id))?;

        let mut variant = product_variant::ActiveModel {
            product_id: Set(product_id),
            color: Set(attrs.color),
            size: Set(attrs.size),
            price: Set(round_money(attrs.price)),
            stock: Set(0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if attrs.initial_stock > 0 {
            let receipt =
                append_movement(&txn, variant.clone(), MovementKind::In, attrs.initial_stock, None)
                    .await?;
            variant.stock = i32::try_from(receipt.balance)
                .map_err(|_| LedgerError::InvalidQuantity(receipt.balance))?;
        }
        txn.commit().await?;

        info!(
            product_id,
            variant_id = variant.id,
            stock = variant.stock,
            "Created product variant"
        );
        Ok(variant)
    }

    /// Removes a product that has no variants left.
    pub async fn delete_product(&self, id: i32) -> LedgerResult<()> {
        let txn = self.db.begin().await?;
        product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product", id))?;

        let variants = VariantEntity::find()
            .filter(product_variant::Column::ProductId.eq(id))
            .count(&txn)
            .await?;
        if variants > 0 {
            return Err(LedgerError::StillReferenced {
                entity: "Product",
                id,
                referenced_by: "product variants",
            });
        }

        product::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(product_id = id, "Deleted product");
        Ok(())
    }

    /// Removes a variant that never took part in a movement or a sale.
    /// Movements and sale lines are never deleted, so a variant they point
    /// to stays.
    pub async fn delete_variant(&self, id: i32) -> LedgerResult<()> {
        let txn = self.db.begin().await?;
        lock_variant(&txn, id).await?;

        let movements = stock_transaction::Entity::find()
            .filter(stock_transaction::Column::ProductVariantId.eq(id))
            .count(&txn)
            .await?;
        if movements > 0 {
            return Err(LedgerError::StillReferenced {
                entity: "Product variant",
                id,
                referenced_by: "stock transactions",
            });
        }
        let records = sales_record::Entity::find()
            .filter(sales_record::Column::ProductVariantId.eq(id))
            .count(&txn)
            .await?;
        if records > 0 {
            return Err(LedgerError::StillReferenced {
                entity: "Product variant",
                id,
                referenced_by: "sales records",
            });
        }

        VariantEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        info!(variant_id = id, "Deleted product variant");
        Ok(())
    }

    pub async fn get_variant(&self, id: i32) -> LedgerResult<product_variant::Model> {
        VariantEntity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product variant", id))
    }

    pub async fn list_variants(&self) -> LedgerResult<Vec<product_variant::Model>> {
        Ok(VariantEntity::find()
            .order_by_asc(product_variant::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn list_variants_by_product(
        &self,
        product_id: i32,
    ) -> LedgerResult<Vec<product_variant::Model>> {
        let product = self.get_product(product_id).await?;
        Ok(product
            .find_related(VariantEntity)
            .order_by_asc(product_variant::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Edits descriptive fields and price. Recorded sale lines keep the
    /// price they were captured with.
    pub async fn update_variant(
        &self,
        id: i32,
        patch: VariantPatch,
        user_id: Option<i32>,
    ) -> LedgerResult<product_variant::Model> {
        if matches!(patch.price, Some(price) if !price_in_range(price)) {
            return Err(LedgerError::InvalidPrice);
        }
        if let Some(target) = patch.stock {
            if target < 0 {
                return Err(LedgerError::InvalidQuantity(target.into()));
            }
        }

        let txn = self.db.begin().await?;
        let current = lock_variant(&txn, id).await?;

        if let Some(target) = patch.stock {
            adjust_within(&txn, current, target, user_id).await?;
        }

        // Re-read so the update below does not clobber the refreshed cache.
        let fresh = VariantEntity::find()
            .filter(product_variant::Column::Id.eq(id))
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product variant", id))?;
        let mut variant: product_variant::ActiveModel = fresh.clone().into();

        if let Some(color) = patch.color {
            variant.color = Set(color);
        }
        if let Some(size) = patch.size {
            variant.size = Set(size);
        }
        if let Some(price) = patch.price {
            variant.price = Set(round_money(price));
        }

        let variant = if variant.is_changed() {
            variant.update(&txn).await?
        } else {
            fresh
        };
        txn.commit().await?;
        Ok(variant)
    }
}
