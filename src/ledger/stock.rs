use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::entities::{
    product_variant,
    stock_transaction::{self, MovementKind},
};
use crate::ledger::aggregate::{apply_movement, fold_movements};
use crate::ledger::error::{LedgerError, LedgerResult};

/// Append-only stock movements and the balances derived from them.
pub struct StockLedger<'a> {
    db: &'a DatabaseConnection,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovementReceipt {
    pub movement: stock_transaction::Model,
    pub balance: i64,
}

impl<'a> StockLedger<'a> {
    pub(crate) fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one movement and refreshes the cached balance in the same
    /// transaction. An `out` that would overdraw is rejected without writing.
    pub async fn record_movement(
        &self,
        variant_id: i32,
        qty: i32,
        kind: MovementKind,
        user_id: Option<i32>,
    ) -> LedgerResult<MovementReceipt> {
        if qty <= 0 {
            return Err(LedgerError::InvalidQuantity(qty.into()));
        }

        let txn = self.db.begin().await?;
        let variant = lock_variant(&txn, variant_id).await?;
        let receipt = append_movement(&txn, variant, kind, qty, user_id).await?;
        txn.commit().await?;

        info!(
            variant_id,
            movement_id = receipt.movement.id,
            kind = %kind,
            qty,
            balance = receipt.balance,
            "Recorded stock movement"
        );
        Ok(receipt)
    }

    /// Balance folded from the movement log. A cached value that disagrees is
    /// logged and overwritten.
    pub async fn current_stock(&self, variant_id: i32) -> LedgerResult<i64> {
        let txn = self.db.begin().await?;
        let variant = lock_variant(&txn, variant_id).await?;
        let balance = checked_balance(&txn, variant_id).await?;

        if i64::from(variant.stock) != balance {
            error!(
                consistency = true,
                variant_id,
                cached = variant.stock,
                ledger = balance,
                "Cached stock diverged from movement log, resynchronizing"
            );
            let mut variant: product_variant::ActiveModel = variant.into();
            variant.stock = Set(to_cached(balance)?);
            variant.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(balance)
    }

    /// Like `current_stock`, but reports a diverged cache instead of repairing it.
    pub async fn verify_stock(&self, variant_id: i32) -> LedgerResult<i64> {
        let variant = product_variant::Entity::find_by_id(variant_id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Product variant", variant_id))?;
        let balance = checked_balance(self.db, variant_id).await?;

        if i64::from(variant.stock) != balance {
            error!(
                consistency = true,
                variant_id,
                cached = variant.stock,
                ledger = balance,
                "Cached stock diverged from movement log"
            );
            return Err(LedgerError::Consistency(format!(
                "variant {} caches stock {} but its movements sum to {}",
                variant_id, variant.stock, balance
            )));
        }
        Ok(balance)
    }

    /// Appends the single compensating movement that brings the balance to
    /// `target`. Returns `None` when the balance already matches.
    pub async fn adjust_stock_to(
        &self,
        variant_id: i32,
        target: i32,
        user_id: Option<i32>,
    ) -> LedgerResult<Option<MovementReceipt>> {
        if target < 0 {
            return Err(LedgerError::InvalidQuantity(target.into()));
        }

        let txn = self.db.begin().await?;
        let variant = lock_variant(&txn, variant_id).await?;
        let receipt = adjust_within(&txn, variant, target, user_id).await?;
        txn.commit().await?;
        Ok(receipt)
    }

    pub async fn list_movements(
        &self,
        variant_id: Option<i32>,
    ) -> LedgerResult<Vec<stock_transaction::Model>> {
        let mut finder = stock_transaction::Entity::find();
        if let Some(variant_id) = variant_id {
            finder = finder.filter(stock_transaction::Column::ProductVariantId.eq(variant_id));
        }
        Ok(finder
            .order_by_asc(stock_transaction::Column::Id)
            .all(self.db)
            .await?)
    }

    pub async fn get_movement(&self, id: i32) -> LedgerResult<stock_transaction::Model> {
        stock_transaction::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| LedgerError::not_found("Stock transaction", id))
    }
}

/// Loads a variant with a row lock where the backend supports one, so
/// check-then-write on its balance is serialized.
pub(crate) async fn lock_variant<C: ConnectionTrait>(
    conn: &C,
    variant_id: i32,
) -> LedgerResult<product_variant::Model> {
    product_variant::Entity::find_by_id(variant_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::not_found("Product variant", variant_id))
}

async fn checked_balance<C: ConnectionTrait>(conn: &C, variant_id: i32) -> LedgerResult<i64> {
    let movements = stock_transaction::Entity::find()
        .filter(stock_transaction::Column::ProductVariantId.eq(variant_id))
        .order_by_asc(stock_transaction::Column::Id)
        .all(conn)
        .await?;
    let balance = fold_movements(&movements);

    if balance < 0 {
        error!(
            consistency = true,
            variant_id, balance, "Movement log folds to a negative balance"
        );
        return Err(LedgerError::Consistency(format!(
            "movements of variant {} sum to {}",
            variant_id, balance
        )));
    }
    Ok(balance)
}

fn to_cached(balance: i64) -> LedgerResult<i32> {
    i32::try_from(balance)
        .map_err(|_| LedgerError::Consistency(format!("balance {} overflows the stock column", balance)))
}

pub(crate) async fn append_movement<C: ConnectionTrait>(
    conn: &C,
    variant: product_variant::Model,
    kind: MovementKind,
    qty: i32,
    user_id: Option<i32>,
) -> LedgerResult<MovementReceipt> {
    let balance = checked_balance(conn, variant.id).await?;
    let next = apply_movement(balance, kind, qty);

    if next < 0 {
        warn!(
            variant_id = variant.id,
            requested = qty,
            available = balance,
            "Rejected stock movement that would overdraw"
        );
        return Err(LedgerError::InsufficientStock {
            variant_id: variant.id,
            requested: qty,
            available: balance,
        });
    }
    let cached = i32::try_from(next).map_err(|_| LedgerError::InvalidQuantity(qty.into()))?;

    let movement = stock_transaction::ActiveModel {
        product_variant_id: Set(variant.id),
        user_id: Set(user_id),
        qty: Set(qty),
        kind: Set(kind),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let mut variant: product_variant::ActiveModel = variant.into();
    variant.stock = Set(cached);
    variant.update(conn).await?;

    Ok(MovementReceipt {
        movement,
        balance: next,
    })
}

pub(crate) async fn adjust_within<C: ConnectionTrait>(
    conn: &C,
    variant: product_variant::Model,
    target: i32,
    user_id: Option<i32>,
) -> LedgerResult<Option<MovementReceipt>> {
    let balance = checked_balance(conn, variant.id).await?;
    let delta = i64::from(target) - balance;

    let (kind, qty) = match delta {
        0 => return Ok(None),
        d if d > 0 => (MovementKind::In, d),
        d => (MovementKind::Out, -d),
    };
    let qty = i32::try_from(qty).map_err(|_| LedgerError::InvalidQuantity(qty))?;

    info!(
        variant_id = variant.id,
        from = balance,
        to = target,
        "Adjusting stock with a compensating movement"
    );
    append_movement(conn, variant, kind, qty, user_id).await.map(Some)
}
