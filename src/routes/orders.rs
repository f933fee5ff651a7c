use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::orders::{
        CompleteOrderRequest, CreateOrderRequest, CreatedOrder, OrderStatusRequest,
        OrderWithItems, PendingOrderList, StatusChange, TransactionList,
    },
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/orders/{id}/complete", patch(complete_order))
        .route("/transactions", get(list_transactions))
        .route("/pending-orders", get(list_pending_orders))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<CreatedOrder>),
        (status = 400, description = "Invalid items, unknown product or table, insufficient stock"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedOrder>>)> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(Pagination),
    responses(
        (status = 200, description = "Completed orders, newest first", body = ApiResponse<TransactionList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = order_service::list_transactions(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pending-orders",
    responses(
        (status = 200, description = "Active orders, oldest first", body = ApiResponse<PendingOrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_pending_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PendingOrderList>>> {
    let resp = order_service::list_pending_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<StatusChange>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order already completed or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<OrderStatusRequest>,
) -> AppResult<Json<ApiResponse<StatusChange>>> {
    let resp = order_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/complete",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = CompleteOrderRequest,
    responses(
        (status = 200, description = "Payment taken", body = ApiResponse<StatusChange>),
        (status = 400, description = "Invalid discount or payment"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No active order with this ID")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn complete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<CompleteOrderRequest>,
) -> AppResult<Json<ApiResponse<StatusChange>>> {
    let resp = order_service::complete_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
