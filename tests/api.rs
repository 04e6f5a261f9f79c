mod common;

use inventory_api::{
    build_app,
    config::{AdminSeed, AppConfig},
    entities::seed_admin,
};
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

const ADMIN_PASSWORD: &str = "Secret15-admin";

/// Serves the app on an ephemeral port and returns its base url.
async fn spawn_app() -> String {
    let db = common::memory_db().await;
    seed_admin(&db, "admin", ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let config = AppConfig {
        database_url: "sqlite::memory:".into(),
        secret: "test-secret".into(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        token_ttl_hours: 1,
        admin_seed: Some(AdminSeed {
            username: "admin".into(),
            password: ADMIN_PASSWORD.into(),
        }),
    };
    let app = build_app(Arc::new(db), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}", addr)
}

async fn login(client: &Client, base: &str, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{base}/login"))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<Value>()
        .await
        .expect("Failed to parse login response JSON");
    body["token"]
        .as_str()
        .expect("Token not found in login response")
        .to_owned()
}

async fn register(client: &Client, base: &str, username: &str) -> String {
    let response = client
        .post(format!("{base}/register"))
        .json(&json!({
            "username": username,
            "password": "Muzion15-pass"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), StatusCode::CREATED);
    login(client, base, username, "Muzion15-pass").await
}

fn bearer(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

fn as_money(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().expect("money string"),
        other => other.as_f64().expect("money number"),
    }
}

/// Creates a product with one variant and returns the variant id.
async fn stock_variant(client: &Client, base: &str, admin: &str, price: &str, stock: i32) -> i64 {
    let response = client
        .post(format!("{base}/api/admin/products"))
        .headers(bearer(admin))
        .json(&json!({ "name": "Jacket", "category": "outerwear" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let product = response.json::<Value>().await.unwrap();

    let response = client
        .post(format!("{base}/api/admin/product-variants"))
        .headers(bearer(admin))
        .json(&json!({
            "product_id": product["id"],
            "color": "navy",
            "size": "S",
            "price": price,
            "stock": stock
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json::<Value>().await.unwrap()["id"]
        .as_i64()
        .expect("variant id")
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_app().await;
    let response = Client::new().get(format!("{base}/")).send().await.unwrap();
    assert!(response.status().is_success(), "Health check failed");
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let base = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{base}/api/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = register(&client, &base, "alice").await;
    let response = client
        .post(format!("{base}/api/admin/products"))
        .headers(bearer(&token))
        .json(&json!({ "name": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stock_movements() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let variant_id = stock_variant(&client, &base, &admin, "20.00", 10).await;

    let response = client
        .post(format!("{base}/api/admin/stock-transactions"))
        .headers(bearer(&admin))
        .json(&json!({ "product_variant_id": variant_id, "qty": 3, "type": "out" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.json::<Value>().await.unwrap()["balance"], 7);

    let response = client
        .post(format!("{base}/api/admin/stock-transactions"))
        .headers(bearer(&admin))
        .json(&json!({ "product_variant_id": variant_id, "qty": 8, "type": "out" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{base}/api/product-variants/{variant_id}/stock"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap()["stock"], 7);
}

#[tokio::test]
async fn test_sale_lifecycle() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let shirt = stock_variant(&client, &base, &admin, "9.99", 5).await;
    let socks = stock_variant(&client, &base, &admin, "5.00", 5).await;
    let user = register(&client, &base, "bob").await;

    let response = client
        .post(format!("{base}/api/sales"))
        .headers(bearer(&user))
        .json(&json!({
            "line_items": [
                { "product_variant_id": shirt, "qty": 2 },
                { "product_variant_id": socks, "qty": 1 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let sale = response.json::<Value>().await.unwrap();
    assert_eq!(sale["status"], "pending");
    assert!((as_money(&sale["total_price"]) - 24.98).abs() < 1e-9);
    let sale_id = sale["id"].as_i64().unwrap();

    let response = client
        .put(format!("{base}/api/sales/{sale_id}"))
        .headers(bearer(&user))
        .json(&json!({ "line_items": [{ "product_variant_id": shirt, "qty": 0 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .patch(format!("{base}/api/sales/{sale_id}/status"))
        .headers(bearer(&user))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .patch(format!("{base}/api/sales/{sale_id}/status"))
        .headers(bearer(&user))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{base}/api/sales-records?sales_id={sale_id}"))
        .headers(bearer(&user))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap().as_array().unwrap().len(), 2);

    let stranger = register(&client, &base, "carol").await;
    let response = client
        .get(format!("{base}/api/sales/{sale_id}"))
        .headers(bearer(&stranger))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_sale_is_not_kept() {
    let base = spawn_app().await;
    let client = Client::new();
    let user = register(&client, &base, "dave").await;

    let response = client
        .post(format!("{base}/api/sales"))
        .headers(bearer(&user))
        .json(&json!({ "line_items": [{ "product_variant_id": 999, "qty": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{base}/api/sales"))
        .headers(bearer(&user))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.json::<Value>().await.unwrap().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_lists_users_without_hashes() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let user = register(&client, &base, "erin").await;

    let response = client
        .get(format!("{base}/api/admin/users"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users = response.json::<Value>().await.unwrap();
    let users = users.as_array().expect("user list");
    assert_eq!(users.len(), 2);
    assert_eq!(users[1]["username"], "erin");
    assert_eq!(users[1]["role"], "user");
    assert!(users.iter().all(|user| user.get("password").is_none()));

    let response = client
        .get(format!("{base}/api/admin/users?role=admin"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    let admins = response.json::<Value>().await.unwrap();
    assert_eq!(admins.as_array().unwrap().len(), 1);
    assert_eq!(admins[0]["username"], "admin");

    let response = client
        .get(format!("{base}/api/admin/users"))
        .headers(bearer(&user))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_deletes_refuse_referenced_rows() {
    let base = spawn_app().await;
    let client = Client::new();
    let admin = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let stocked = stock_variant(&client, &base, &admin, "7.00", 3).await;
    let empty = stock_variant(&client, &base, &admin, "7.00", 0).await;

    let response = client
        .delete(format!("{base}/api/admin/product-variants/{stocked}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let variant = client
        .get(format!("{base}/api/product-variants/{empty}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap();
    let product_id = variant["product_id"].as_i64().expect("product id");

    let response = client
        .delete(format!("{base}/api/admin/products/{product_id}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .delete(format!("{base}/api/admin/product-variants/{empty}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{base}/api/admin/products/{product_id}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{base}/api/products/{product_id}"))
        .headers(bearer(&admin))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
