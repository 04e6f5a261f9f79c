use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::error::{respond, ApiResult};
use crate::ledger::{Ledger, NewProduct, NewVariant, ProductPatch, VariantPatch};
use crate::middleware::auth::Claims;

//ROUTERS
pub fn admin_product_router() -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", patch(patch_product).delete(delete_product))
        .route("/product-variants", post(create_variant))
        .route(
            "/product-variants/:id",
            patch(patch_variant).delete(delete_variant),
        )
}

//ROUTES
async fn create_product(
    Extension(ledger): Extension<Ledger>,
    Json(payload): Json<CreateProduct>,
) -> ApiResult {
    payload.validate()?;
    let product = ledger
        .catalog()
        .create_product(NewProduct {
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            category: payload.category.unwrap_or_default(),
        })
        .await?;
    respond(StatusCode::CREATED, product)
}

async fn patch_product(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Json(payload): Json<PatchProductPayload>,
) -> ApiResult {
    payload.validate()?;
    let product = ledger
        .catalog()
        .update_product(
            id,
            ProductPatch {
                name: payload.name,
                description: payload.description,
                category: payload.category,
            },
        )
        .await?;
    respond(StatusCode::OK, product)
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    ledger.catalog().delete_product(id).await?;
    respond(
        StatusCode::OK,
        json!({
            "message": "Resource deleted successfully"
        }),
    )
}

async fn create_variant(
    Extension(ledger): Extension<Ledger>,
    Json(payload): Json<CreateVariant>,
) -> ApiResult {
    let variant = ledger
        .catalog()
        .create_variant(
            payload.product_id,
            NewVariant {
                color: payload.color.unwrap_or_default(),
                size: payload.size.unwrap_or_default(),
                price: payload.price,
                initial_stock: payload.stock.unwrap_or_default(),
            },
        )
        .await?;
    respond(StatusCode::CREATED, variant)
}

async fn patch_variant(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchVariantPayload>,
) -> ApiResult {
    let variant = ledger
        .catalog()
        .update_variant(
            id,
            VariantPatch {
                color: payload.color,
                size: payload.size,
                price: payload.price,
                stock: payload.stock,
            },
            Some(claims.user_id),
        )
        .await?;
    respond(StatusCode::OK, variant)
}

async fn delete_variant(
    Path(id): Path<i32>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    ledger.catalog().delete_variant(id).await?;
    respond(
        StatusCode::OK,
        json!({
            "message": "Resource deleted successfully"
        }),
    )
}

//Structs
#[derive(Deserialize, Validate, Debug)]
struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    name: String,
    description: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
struct PatchProductPayload {
    #[validate(length(min = 1, max = 255))]
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CreateVariant {
    product_id: i32,
    color: Option<String>,
    size: Option<String>,
    price: Decimal,
    stock: Option<i32>,
}

#[derive(Deserialize, Debug)]
struct PatchVariantPayload {
    color: Option<String>,
    size: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
}
