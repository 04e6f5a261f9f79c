use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::{respond, ApiError, ApiResult};
use crate::entities::sales::Status;
use crate::ledger::{Ledger, LedgerError, LineItemInput, SaleDetail};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn sales_router() -> Router {
    Router::new()
        .route("/sales", get(get_sales).post(create_sale))
        .route(
            "/sales/:id",
            get(get_sale).put(replace_sale_items).delete(delete_sale),
        )
        .route("/sales/:id/status", patch(patch_status))
        .route("/sales-records", get(get_records))
        .route("/sales-records/:id", get(get_record))
}

//ROUTES
async fn get_sales(
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
) -> ApiResult {
    let owner = (!claims.is_admin()).then_some(claims.user_id);
    let sales = ledger.sales().list_sales(owner).await?;
    respond(StatusCode::OK, sales)
}

async fn get_sale(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
) -> ApiResult {
    let sale = owned_sale(&ledger, &claims, id).await?;
    respond(StatusCode::OK, sale)
}

async fn create_sale(
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<LineItemsPayload>,
) -> ApiResult {
    let detail = ledger
        .sales()
        .open_sale_with_items(claims.user_id, &payload.line_items)
        .await?;
    respond(StatusCode::CREATED, detail)
}

async fn replace_sale_items(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<LineItemsPayload>,
) -> ApiResult {
    owned_sale(&ledger, &claims, id).await?;
    let detail = ledger
        .sales()
        .replace_line_items(id, &payload.line_items)
        .await?;
    respond(StatusCode::OK, detail)
}

async fn patch_status(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<StatusPayload>,
) -> ApiResult {
    owned_sale(&ledger, &claims, id).await?;
    let sale = ledger.sales().set_status(id, payload.status).await?;
    respond(StatusCode::OK, sale)
}

async fn delete_sale(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
) -> ApiResult {
    owned_sale(&ledger, &claims, id).await?;
    ledger.sales().delete_sale(id).await?;
    respond(
        StatusCode::OK,
        json!({
            "message": "Resource deleted successfully"
        }),
    )
}

async fn get_records(
    Query(params): Query<RecordsQuery>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
) -> ApiResult {
    let sales = ledger.sales();

    if let Some(sales_id) = params.sales_id {
        owned_sale(&ledger, &claims, sales_id).await?;
        return respond(StatusCode::OK, sales.list_line_items(Some(sales_id)).await?);
    }
    if claims.is_admin() {
        return respond(StatusCode::OK, sales.list_line_items(None).await?);
    }

    let mut records = Vec::new();
    for sale in sales.list_sales(Some(claims.user_id)).await? {
        records.extend(sales.list_line_items(Some(sale.id)).await?);
    }
    respond(StatusCode::OK, records)
}

async fn get_record(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
) -> ApiResult {
    let record = ledger.sales().get_line_item(id).await?;
    owned_sale(&ledger, &claims, record.sales_id)
        .await
        .map_err(|_| ApiError::from(LedgerError::not_found("Sales record", id)))?;
    respond(StatusCode::OK, record)
}

/// Loads a sale the caller may see; other users' sales look absent.
async fn owned_sale(ledger: &Ledger, claims: &Claims, id: i32) -> Result<SaleDetail, ApiError> {
    let sale = ledger.sales().get_sale(id).await?;
    if !claims.is_admin() && sale.sale.user_id != claims.user_id {
        return Err(LedgerError::not_found("Sale", id).into());
    }
    Ok(sale)
}

//Structs
#[derive(Deserialize, Debug)]
struct LineItemsPayload {
    #[serde(default)]
    line_items: Vec<LineItemInput>,
}

#[derive(Deserialize)]
struct StatusPayload {
    status: Status,
}

#[derive(Deserialize)]
struct RecordsQuery {
    sales_id: Option<i32>,
}
