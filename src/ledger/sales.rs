use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::entities::{
    product_variant,
    sales::{self, Status},
    sales_record, user,
};
use crate::ledger::aggregate::{compute_total, round_money};
use crate::ledger::error::{LedgerError, LedgerResult};

/// Sale headers, their line-items and the totals derived from them.
pub struct SalesLedger<'a> {
    db: &'a DatabaseConnection,
}

/// A requested line-item. The price is taken from the variant when the
/// line is recorded.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct LineItemInput {
    pub product_variant_id: i32,
    pub qty: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: sales::Model,
    pub line_items: Vec<sales_record::Model>,
}

impl<'a> SalesLedger<'a> {
    pub(crate) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn open_sale(&self, user_id: i32) -> LedgerResult<sales::Model> {
        user::Entity::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("User", user_id))?;

        let now = Utc::now();
        let sale = sales::ActiveModel {
            user_id: Set(user_id),
            status: Set(Status::Pending),
            total_price: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        info!(sales_id = sale.id, user_id, "Opened sale");
        Ok(sale)
    }

    /// Opens a sale and records its first line-items in one transaction,
    /// so a rejected item set leaves no header behind.
    pub async fn open_sale_with_items(
        &self,
        user_id: i32,
        items: &[LineItemInput],
    ) -> LedgerResult<SaleDetail> {
        check_quantities(items)?;

        let txn = self.db.begin().await?;
        user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("User", user_id))?;

        let now = Utc::now();
        let sale = sales::ActiveModel {
            user_id: Set(user_id),
            status: Set(Status::Pending),
            total_price: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let detail = write_line_items(&txn, sale, items).await?;
        txn.commit().await?;

        info!(
            sales_id = detail.sale.id,
            user_id,
            lines = detail.line_items.len(),
            total = %detail.sale.total_price,
            "Opened sale"
        );
        Ok(detail)
    }

    /// Swaps the whole line-item set of a pending sale and stores the
    /// recomputed total, all in one transaction.
    pub async fn replace_line_items(
        &self,
        sales_id: i32,
        items: &[LineItemInput],
    ) -> LedgerResult<SaleDetail> {
        check_quantities(items)?;

        let txn = self.db.begin().await?;
        let sale = sales::Entity::find_by_id(sales_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", sales_id))?;
        if sale.status.is_terminal() {
            return Err(LedgerError::SaleClosed {
                id: sales_id,
                status: sale.status,
            });
        }

        let detail = write_line_items(&txn, sale, items).await?;
        txn.commit().await?;

        info!(
            sales_id,
            lines = detail.line_items.len(),
            total = %detail.sale.total_price,
            "Replaced sale line items"
        );
        Ok(detail)
    }

    /// pending → completed | cancelled. Repeating the current status is a no-op.
    pub async fn set_status(&self, sales_id: i32, status: Status) -> LedgerResult<sales::Model> {
        let txn = self.db.begin().await?;
        let sale = sales::Entity::find_by_id(sales_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", sales_id))?;

        if sale.status == status {
            return Ok(sale);
        }
        if sale.status.is_terminal() || status == Status::Pending {
            return Err(LedgerError::InvalidTransition {
                from: sale.status,
                to: status,
            });
        }

        let from = sale.status;
        let mut sale: sales::ActiveModel = sale.into();
        sale.status = Set(status);
        sale.updated_at = Set(Utc::now());
        let sale = sale.update(&txn).await?;
        txn.commit().await?;

        info!(sales_id, from = %from, to = %status, "Changed sale status");
        Ok(sale)
    }

    pub async fn get_sale(&self, sales_id: i32) -> LedgerResult<SaleDetail> {
        let sale = self.find_sale(sales_id).await?;
        let line_items = records_of(self.db, sales_id).await?;
        Ok(SaleDetail { sale, line_items })
    }

    pub async fn list_sales(&self, user_id: Option<i32>) -> LedgerResult<Vec<sales::Model>> {
        let mut finder = sales::Entity::find();
        if let Some(user_id) = user_id {
            finder = finder.filter(sales::Column::UserId.eq(user_id));
        }
        Ok(finder.order_by_asc(sales::Column::Id).all(self.db).await?)
    }

    pub async fn list_line_items(
        &self,
        sales_id: Option<i32>,
    ) -> LedgerResult<Vec<sales_record::Model>> {
        let mut finder = sales_record::Entity::find();
        if let Some(sales_id) = sales_id {
            finder = finder.filter(sales_record::Column::SalesId.eq(sales_id));
        }
        Ok(finder
            .order_by_asc(sales_record::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn get_line_item(&self, id: i32) -> LedgerResult<sales_record::Model> {
        sales_record::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sales record", id))
    }

    /// Total recomputed from the line-items. A stored total that disagrees is
    /// logged and overwritten.
    pub async fn sale_total(&self, sales_id: i32) -> LedgerResult<Decimal> {
        let txn = self.db.begin().await?;
        let sale = sales::Entity::find_by_id(sales_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", sales_id))?;
        let total = compute_total(&records_of(&txn, sales_id).await?)?;

        if round_money(sale.total_price) != total {
            error!(
                consistency = true,
                sales_id,
                stored = %sale.total_price,
                computed = %total,
                "Stored sale total diverged from its line items, resynchronizing"
            );
            let mut sale: sales::ActiveModel = sale.into();
            sale.total_price = Set(total);
            sale.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(total)
    }

    /// Like `sale_total`, but reports a diverged total instead of repairing it.
    pub async fn verify_total(&self, sales_id: i32) -> LedgerResult<Decimal> {
        let sale = self.find_sale(sales_id).await?;
        let total = compute_total(&records_of(self.db, sales_id).await?)?;

        if round_money(sale.total_price) != total {
            error!(
                consistency = true,
                sales_id,
                stored = %sale.total_price,
                computed = %total,
                "Stored sale total diverged from its line items"
            );
            return Err(LedgerError::Consistency(format!(
                "sale {} stores total {} but its line items sum to {}",
                sales_id, sale.total_price, total
            )));
        }
        Ok(total)
    }

    /// Removes a pending sale together with its line-items.
    pub async fn delete_sale(&self, sales_id: i32) -> LedgerResult<()> {
        let txn = self.db.begin().await?;
        let sale = sales::Entity::find_by_id(sales_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", sales_id))?;
        if sale.status.is_terminal() {
            return Err(LedgerError::SaleClosed {
                id: sales_id,
                status: sale.status,
            });
        }

        sales_record::Entity::delete_many()
            .filter(sales_record::Column::SalesId.eq(sales_id))
            .exec(&txn)
            .await?;
        sales::Entity::delete_by_id(sales_id).exec(&txn).await?;
        txn.commit().await?;

        info!(sales_id, "Deleted sale");
        Ok(())
    }

    async fn find_sale(&self, sales_id: i32) -> LedgerResult<sales::Model> {
        sales::Entity::find_by_id(sales_id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Sale", sales_id))
    }
}

async fn records_of<C: ConnectionTrait>(
    conn: &C,
    sales_id: i32,
) -> LedgerResult<Vec<sales_record::Model>> {
    Ok(sales_record::Entity::find()
        .filter(sales_record::Column::SalesId.eq(sales_id))
        .order_by_asc(sales_record::Column::Id)
        .all(conn)
        .await?)
}

fn check_quantities(items: &[LineItemInput]) -> LedgerResult<()> {
    for (index, item) in items.iter().enumerate() {
        if item.qty <= 0 {
            return Err(LedgerError::line_item(
                index,
                format!("qty must be greater than 0, got {}", item.qty),
            ));
        }
    }
    Ok(())
}

/// Replaces the line-items of `sale` with `items`, pricing each line from its
/// variant, and stores the new total. Runs inside the caller's transaction.
async fn write_line_items<C: ConnectionTrait>(
    conn: &C,
    sale: sales::Model,
    items: &[LineItemInput],
) -> LedgerResult<SaleDetail> {
    let sales_id = sale.id;
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let variant = product_variant::Entity::find_by_id(item.product_variant_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                LedgerError::line_item(
                    index,
                    format!("product variant {} does not exist", item.product_variant_id),
                )
            })?;
        records.push(sales_record::ActiveModel {
            sales_id: Set(sales_id),
            product_variant_id: Set(variant.id),
            qty: Set(item.qty),
            price_each: Set(round_money(variant.price)),
            ..Default::default()
        });
    }

    sales_record::Entity::delete_many()
        .filter(sales_record::Column::SalesId.eq(sales_id))
        .exec(conn)
        .await?;
    if !records.is_empty() {
        sales_record::Entity::insert_many(records).exec(conn).await?;
    }

    let line_items = records_of(conn, sales_id).await?;
    let total = compute_total(&line_items)?;

    let mut sale: sales::ActiveModel = sale.into();
    sale.total_price = Set(total);
    sale.updated_at = Set(Utc::now());
    let mut sale = sale.update(conn).await?;
    sale.total_price = total;

    Ok(SaleDetail { sale, line_items })
}
