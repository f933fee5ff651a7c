mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use restaurant_pos_api::{routes::build_app, seed::seed_defaults};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> anyhow::Result<Router> {
    let state = common::setup_state().await?;
    seed_defaults(&state.pool).await?;
    Ok(build_app(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request.body(Body::from(body.unwrap_or_default().to_owned()))?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, value))
}

async fn login(app: &Router, username: &str) -> anyhow::Result<String> {
    let body = json!({ "username": username, "pin": 12345 }).to_string();
    let (status, value) = send(app, Method::POST, "/api/login", None, Some(&body)).await?;
    assert_eq!(status, StatusCode::OK, "login failed: {value}");
    Ok(value["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_owned())
}

#[tokio::test]
async fn probes_answer_without_auth() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, value) = send(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["status"], "ok");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let text = to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&text[..], b"Backend is running");

    let (status, value) = send(&app, Method::GET, "/no/such/path", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["data"]["path"], "/no/such/path");
    Ok(())
}

#[tokio::test]
async fn api_requires_a_valid_token() -> anyhow::Result<()> {
    let app = app().await?;

    let (status, _) = send(&app, Method::GET, "/api/products", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, value) =
        send(&app, Method::GET, "/api/products", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["data"]["error"], "Invalid or expired token");

    let bad_pin = json!({ "username": "admin", "pin": "00000" }).to_string();
    let (status, value) = send(&app, Method::POST, "/api/login", None, Some(&bad_pin)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["message"], "Invalid credentials.");
    Ok(())
}

#[tokio::test]
async fn roles_gate_the_routes() -> anyhow::Result<()> {
    let app = app().await?;
    let waiter = login(&app, "waiter").await?;
    let manager = login(&app, "manager").await?;

    let (status, _) = send(&app, Method::GET, "/api/sales/metrics", Some(&waiter), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, "/api/transactions", Some(&waiter), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, value) =
        send(&app, Method::GET, "/api/sales/metrics", Some(&manager), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"]["today_sales"], 0.0);

    let (status, value) = send(&app, Method::GET, "/api/products", Some(&waiter), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"].as_array().map(Vec::len), Some(10));
    Ok(())
}

#[tokio::test]
async fn order_round_trip_over_http() -> anyhow::Result<()> {
    let app = app().await?;
    let waiter = login(&app, "waiter").await?;
    let cashier = login(&app, "cashier").await?;

    let body = json!({
        "items": [{ "product": { "id": 1, "name": "Espresso", "price": 0.01 }, "quantity": 2 }],
        "tableId": 1,
        "status": "pending"
    })
    .to_string();
    let (status, value) = send(&app, Method::POST, "/api/orders", Some(&waiter), Some(&body)).await?;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    // Prices come from the catalog, not the request.
    assert_eq!(value["data"]["final_total"], 7.0);
    let order_id = value["data"]["order_id"].as_i64().expect("order id");

    let (status, value) =
        send(&app, Method::GET, "/api/pending-orders", Some(&waiter), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["data"][0]["table_current_status"], "occupied");

    let pay = json!({ "paymentType": "card", "amountPaid": 7.0 }).to_string();
    let uri = format!("/api/orders/{order_id}/complete");
    let (status, _) = send(&app, Method::PATCH, &uri, Some(&cashier), Some(&pay)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, value) = send(&app, Method::PATCH, &uri, Some(&cashier), Some(&pay)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        value["message"],
        "Active order not found or already completed/cancelled."
    );

    let (status, value) =
        send(&app, Method::GET, "/api/transactions?page=1&per_page=10", Some(&cashier), None)
            .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["meta"]["total"], 1);
    assert_eq!(value["data"][0]["payment_type"], "card");
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() -> anyhow::Result<()> {
    let app = app().await?;
    let cashier = login(&app, "cashier").await?;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&cashier),
        Some("{\"items\": [oops"),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let empty = json!({ "items": [] }).to_string();
    let (status, value) =
        send(&app, Method::POST, "/api/orders", Some(&cashier), Some(&empty)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["message"], "Order must contain at least one item.");
    Ok(())
}

#[tokio::test]
async fn tokens_follow_the_current_account() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    seed_defaults(&state.pool).await?;
    let app = build_app(state.clone());
    let manager = login(&app, "manager").await?;
    let waiter = login(&app, "waiter").await?;

    let (status, _) = send(&app, Method::GET, "/api/sales/metrics", Some(&manager), None).await?;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE users SET role = 'waiter' WHERE username = 'manager'")
        .execute(&state.pool)
        .await?;
    let (status, _) = send(&app, Method::GET, "/api/sales/metrics", Some(&manager), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    sqlx::query("DELETE FROM users WHERE username = 'waiter'")
        .execute(&state.pool)
        .await?;
    let (status, value) = send(&app, Method::GET, "/api/products", Some(&waiter), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(value["message"], "Account no longer exists");
    Ok(())
}
