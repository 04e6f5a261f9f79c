use axum::{extract::Extension, http::StatusCode, routing::post, Json, Router};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::api::error::{respond, ApiError, ApiResult};
use crate::entities::user::{self, hash_password, Entity as UserEntity, Role};
use crate::ledger::Ledger;
use crate::middleware::auth::{generate_token, TokenKeys};

pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
}

async fn register_user(
    Extension(ledger): Extension<Ledger>,
    Json(payload): Json<Credentials>,
) -> ApiResult {
    payload.validate()?;
    let db = ledger.db();

    let taken = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let password = hash_password(&payload.password)
        .map_err(|err| ApiError::Internal(format!("Failed to hash password: {err}")))?;

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        password: Set(password),
        role: Set(Role::User),
        ..Default::default()
    }
    .insert(db)
    .await?;

    respond(
        StatusCode::CREATED,
        json!({
            "message": "User registered successfully",
            "id": new_user.id
        }),
    )
}

async fn login(
    Extension(ledger): Extension<Ledger>,
    Extension(keys): Extension<Arc<TokenKeys>>,
    Json(payload): Json<Credentials>,
) -> ApiResult {
    let model = UserEntity::find()
        .filter(user::Column::Username.eq(&*payload.username))
        .one(ledger.db())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".into()))?;

    model
        .check_hash(&payload.password)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".into()))?;

    let token = generate_token(&keys, model.id, model.role)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    respond(
        StatusCode::OK,
        json!({
            "token": token
        }),
    )
}

#[derive(Deserialize, Validate, Debug)]
struct Credentials {
    #[validate(length(min = 1, max = 64))]
    username: String,
    #[validate(length(min = 8))]
    password: String,
}
