use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};

use crate::{
    dto::kitchen::{ItemStatusChanged, ItemStatusRequest, KitchenItemList},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending-items", get(list_pending_items))
        .route("/order-items/{item_id}/status", patch(update_item_status))
}

#[utoipa::path(
    get,
    path = "/api/kitchen/pending-items",
    responses(
        (status = 200, description = "Items not yet ready", body = ApiResponse<KitchenItemList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn list_pending_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<KitchenItemList>>> {
    let resp = kitchen_service::list_pending_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/kitchen/order-items/{item_id}/status",
    params(("item_id" = i64, Path, description = "Order item ID")),
    request_body = ItemStatusRequest,
    responses(
        (status = 200, description = "Item status changed", body = ApiResponse<ItemStatusChanged>),
        (status = 400, description = "Invalid item status"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn update_item_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<i64>,
    AppJson(payload): AppJson<ItemStatusRequest>,
) -> AppResult<Json<ApiResponse<ItemStatusChanged>>> {
    let resp = kitchen_service::update_item_status(&state, &user, item_id, payload).await?;
    Ok(Json(resp))
}
