use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    routing::get,
    Router,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::api::error::{respond, ApiResult};
use crate::entities::user::{self, Role};
use crate::ledger::Ledger;

//ROUTERS
pub fn admin_user_router() -> Router {
    Router::new().route("/users", get(get_users))
}

//ROUTES
async fn get_users(
    Query(params): Query<UsersQuery>,
    Extension(ledger): Extension<Ledger>,
) -> ApiResult {
    let mut finder = user::Entity::find();
    if let Some(role) = params.role {
        finder = finder.filter(user::Column::Role.eq(role));
    }
    let users: Vec<UserSummary> = finder
        .order_by_asc(user::Column::Id)
        .all(ledger.db())
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();

    respond(StatusCode::OK, users)
}

//Structs
#[derive(Deserialize)]
struct UsersQuery {
    role: Option<Role>,
}

/// Account as listed to admins, without the password hash.
#[derive(Serialize)]
struct UserSummary {
    id: i32,
    username: String,
    role: Role,
}

impl From<user::Model> for UserSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
        }
    }
}
