use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::error::{respond, ApiResult};
use crate::ledger::Ledger;

pub fn stock_router() -> Router {
    Router::new()
        .route("/stock-transactions", get(get_movements))
        .route("/stock-transactions/:id", get(get_movement))
}

async fn get_movements(
    Query(params): Query<MovementsQuery>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    let movements = ledger
        .stock()
        .list_movements(params.product_variant_id)
        .await?;
    respond(StatusCode::OK, movements)
}

async fn get_movement(Path(id): Path<i32>, Extension(ledger): Extension<Ledger>) -> ApiResult {
    let movement = ledger.stock().get_movement(id).await?;
    respond(StatusCode::OK, movement)
}

#[derive(Deserialize)]
struct MovementsQuery {
    product_variant_id: Option<i32>,
}
