//! The inventory ledger: catalog, stock movements and sales, tied together by
//! the derivations in [`aggregate`].

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod sales;
pub mod stock;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use aggregate::{compute_total, fold_movements, PricedLine};
pub use catalog::{CatalogStore, NewProduct, NewVariant, ProductPatch, VariantPatch};
pub use error::{LedgerError, LedgerResult};
pub use sales::{LineItemInput, SaleDetail, SalesLedger};
pub use stock::{MovementReceipt, StockLedger};

/// Built once at startup and cloned into whatever needs ledger access.
#[derive(Clone, Debug)]
pub struct Ledger {
    db: Arc<DatabaseConnection>,
}

impl Ledger {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn db_handle(&self) -> Arc<DatabaseConnection> {
        self.db.clone()
    }

    pub fn catalog(&self) -> CatalogStore<'_> {
        CatalogStore::new(&self.db)
    }

    pub fn stock(&self) -> StockLedger<'_> {
        StockLedger::new(&self.db)
    }

    pub fn sales(&self) -> SalesLedger<'_> {
        SalesLedger::new(&self.db)
    }
}
