use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::{respond, ApiResult};
use crate::entities::{product, product_variant};
use crate::ledger::Ledger;

//ROUTERS
pub fn product_router() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .route("/product-variants", get(get_variants))
        .route("/product-variants/:id", get(get_variant))
        .route("/product-variants/:id/stock", get(get_variant_stock))
}

//ROUTES
async fn get_products(Extension(ledger): Extension<Ledger>) -> ApiResult {
    let products = ledger.catalog().list_products().await?;
    respond(StatusCode::OK, products)
}

async fn get_product(Path(id): Path<i32>, Extension(ledger): Extension<Ledger>) -> ApiResult {
    let catalog = ledger.catalog();
    let product = catalog.get_product(id).await?;
    let variants = catalog.list_variants_by_product(id).await?;
    respond(StatusCode::OK, ProductWithVariants { product, variants })
}

async fn get_variants(
    Query(params): Query<VariantsQuery>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    let catalog = ledger.catalog();
    let variants = match params.product_id {
        Some(product_id) => catalog.list_variants_by_product(product_id).await?,
        None => catalog.list_variants().await?,
    };
    respond(StatusCode::OK, variants)
}

async fn get_variant(Path(id): Path<i32>, Extension(ledger): Extension<Ledger>) -> ApiResult {
    let variant = ledger.catalog().get_variant(id).await?;
    respond(StatusCode::OK, variant)
}

async fn get_variant_stock(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    let stock = ledger.stock().current_stock(id).await?;
    respond(
        StatusCode::OK,
        json!({
            "product_variant_id": id,
            "stock": stock
        }),
    )
}

//Structs
#[derive(Deserialize)]
struct VariantsQuery {
    product_id: Option<i32>,
}

#[derive(Serialize)]
struct ProductWithVariants {
    #[serde(flatten)]
    product: product::Model,
    variants: Vec<product_variant::Model>,
}
