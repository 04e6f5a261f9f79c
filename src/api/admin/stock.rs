use axum::{extract::Extension, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::error::{respond, ApiResult};
use crate::entities::stock_transaction::MovementKind;
use crate::ledger::Ledger;
use crate::middleware::auth::Claims;

pub fn admin_stock_router() -> Router {
    Router::new().route("/stock-transactions", post(create_movement))
}

async fn create_movement(
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateMovement>,
) -> ApiResult {
    let receipt = ledger
        .stock()
        .record_movement(
            payload.product_variant_id,
            payload.qty,
            payload.kind,
            Some(claims.user_id),
        )
        .await?;
    respond(StatusCode::CREATED, receipt)
}

#[derive(Deserialize, Debug)]
struct CreateMovement {
    product_variant_id: i32,
    qty: i32,
    #[serde(rename = "type")]
    kind: MovementKind,
}
